//! Vocabulary shared by row and cell attribute resolution.

mod border;
mod category;
mod value;

pub use border::{BorderStyle, Borders};
pub use category::{ColorCategory, QueryReason, SeverityKind};
pub use value::{CellStyle, CellValue, ColumnKind, HorizontalAlignment, IconRef};
