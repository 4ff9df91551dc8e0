use crate::models::{Gender, GenderPref, Participant};

/// One-way gate: does `pref` accept a candidate of identity `identity`?
///
/// The table is closed: `Men` accepts only `Male`, `Women` accepts only
/// `Female`, and `Bisexual` accepts every identity. Combinations outside the
/// table are ineligible rather than errors.
#[inline]
pub fn accepts(pref: GenderPref, identity: Gender) -> bool {
    match pref {
        GenderPref::Men => matches!(identity, Gender::Male),
        GenderPref::Women => matches!(identity, Gender::Female),
        GenderPref::Bisexual => true,
    }
}

/// Two participants may be matched only when each accepts the other's
/// identity. One-way interest is not enough.
#[inline]
pub fn mutually_eligible(a: &Participant, b: &Participant) -> bool {
    accepts(a.pref, b.gender) && accepts(b.pref, a.gender)
}
