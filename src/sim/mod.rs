//! Client session simulation
//!
//! All game-state logic lives here. This module must stay platform free:
//! - Time is passed in explicitly (milliseconds)
//! - No rendering, DOM or network calls
//! - Single owner (`Session`), no globals

pub mod clock;
pub mod hit;
pub mod reconciler;
pub mod session;
pub mod target;

pub use clock::{SessionClock, SessionPhase};
pub use hit::{HitDetector, SliceEvent};
pub use reconciler::{Feedback, Outcome, Reconciler, ReconcilerState};
pub use session::{Frame, LinkState, Notice, Scene, Session, Sprite};
pub use target::{Target, TargetSet};
