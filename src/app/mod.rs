// Application layer - Use case interactors

pub mod analyze_interactor;
pub mod container;
pub mod repair_interactor;
pub mod verify_interactor;

// Re-export interactors
pub use analyze_interactor::AnalyzeInteractor;
pub use container::AppContainer;
pub use repair_interactor::{RepairInteractor, RepairRequest};
pub use verify_interactor::{VerificationReport, VerifyInteractor};
