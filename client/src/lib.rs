// Client core for the arena: a local mirror of remote player state,
// reconciled from server snapshots and deltas, plus the interpolation engine
// that smooths discrete updates into continuous motion.
//
// Rendering, input capture and UI are external collaborators; everything here
// is headless and driven by explicit timestamps so it stays testable.

pub mod interp;
pub mod mirror;
pub mod net;
pub mod session;
