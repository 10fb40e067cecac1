pub mod parecer_flow;

pub use parecer_flow::{ParecerFlow, PayloadStatus, SavedReport, SubmitOutcome};
