pub mod gate;
pub mod wizard;

pub use gate::{DetachedHost, GateState, NavigationGate, StepHost};
pub use wizard::{ActiveStepHost, WizardStep};
