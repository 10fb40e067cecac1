pub mod archive;
pub mod form;
pub mod placeholder;
pub mod record;

pub use archive::ParecerArchive;
pub use form::{parse_birth_date, ParecerForm, NOT_ATTENDING_TEXT};
pub use placeholder::{Placeholder, Substitutions};
pub use record::{EvaluationRecord, BIRTH_DATE_FORMAT, TIMESTAMP_FORMAT};
