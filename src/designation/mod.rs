//! # Packed designations
//!
//! MPC 80-column records identify an object with a single 12-character packed field
//! (columns 1-12). ADES instead wants the identity split into up to three explicit
//! fields: a permanent ID, a provisional designation and a tracking label.
//!
//! ## Overview
//!
//! - [`ObjectIdentity`]: the unpacked `(permID, provID, trkSub)` triple
//! - [`ObjectIdentity::from_packed`]: decode a packed field into an identity
//! - [`ObjectIdentity::to_packed`]: re-encode an identity into the packed field
//! - [`pack_prog_id`] / [`unpack_prog_id`]: program-code hex packing
//!
//! ## Packed layout
//!
//! The 12 columns hold two zones. Columns 1-5 carry a permanent number when present
//! (minor planet, numbered comet, or numbered natural satellite, each with its own
//! shape). Columns 6-12 carry a provisional designation, a survey designation, comet
//! fragment letters, or a free-form tracking label. The zone shapes are mutually
//! exclusive, so a packed field belongs to exactly one family.
//!
//! ## Units & Conventions
//!
//! - Minor planet numbers: 1 through 619999, first "digit" base 62
//! - Provisional years: century letter (`I`/`J`/`K`) times 100 plus two digits
//! - Comet types: `P`/`D` for permanent IDs, plus `A`/`C`/`I`/`X` provisionally
//!
//! ## See also
//!
//! - [`crate::record`] for the surrounding 80-column grammar

pub mod alphabet;
mod pack;
mod unpack;

pub use pack::{pack_prog_id, unpack_prog_id};

use crate::errors::Mpc2AdesError;

/// Unpacked object identity, the `(permID, provID, trkSub)` triple of ADES.
///
/// At most one of `trk_sub` and the other two is populated for a valid identity:
/// a record is either structured (permanent and/or provisional) or a bare
/// tracking label, never both.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectIdentity {
    /// Permanent ID, e.g. `"7968"`, `"73P"`, `"141P-A"` or `"Jupiter 1"`.
    pub perm_id: Option<String>,
    /// Provisional designation, e.g. `"2014 AA360"`, `"C/2048 X13"` or `"S/1610 J 1"`.
    pub prov_id: Option<String>,
    /// Observer-assigned tracking label, 1-7 characters.
    pub trk_sub: Option<String>,
}

impl ObjectIdentity {
    pub fn new(perm_id: Option<&str>, prov_id: Option<&str>, trk_sub: Option<&str>) -> Self {
        ObjectIdentity {
            perm_id: perm_id.map(str::to_string),
            prov_id: prov_id.map(str::to_string),
            trk_sub: trk_sub.map(str::to_string),
        }
    }

    /// Decode a 12-character packed ID field.
    ///
    /// Arguments
    /// -----------------
    /// * `packed`: the packed field, at most 12 characters (shorter input is
    ///   treated as blank-padded on the right).
    ///
    /// Return
    /// ----------
    /// * The decoded identity, or an error when no designation family matches or
    ///   a matching family carries an out-of-range number.
    ///
    /// See also
    /// ------------
    /// * [`ObjectIdentity::to_packed`] – the inverse operation
    pub fn from_packed(packed: &str) -> Result<Self, Mpc2AdesError> {
        unpack::unpack_packed_id(packed)
    }

    /// Encode the identity back into the 12-character packed field.
    ///
    /// Return
    /// ----------
    /// * The packed field, always exactly 12 characters, or an error when a
    ///   component does not fit any packing grammar or the components are
    ///   inconsistent with each other.
    pub fn to_packed(&self) -> Result<String, Mpc2AdesError> {
        pack::pack_identity(self)
    }

    /// Debug rendering of the triple used in packing error messages.
    pub(crate) fn triple_text(&self) -> String {
        format!(
            "({:?}, {:?}, {:?})",
            self.perm_id, self.prov_id, self.trk_sub
        )
    }
}

/// Designation family shared by the permanent and provisional grammars.
///
/// A permanent ID and a provisional designation may only be packed together
/// when they belong to the same family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IdentityClass {
    MinorPlanet,
    Comet,
    CometFragment,
    Satellite,
}
