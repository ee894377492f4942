//! Builds the business documents a small office produces: résumés, business letters and
//! meeting protocols.
//!
//! A document is created from a [`FieldValues`] snapshot through [`create_document`].  It can
//! be validated, previewed as an HTML fragment, and turned into a [`LayoutDocument`] which
//! [`PdfBuilder`] renders to PDF.
//!
//! ```no_run
//! use document_builder::{create_document, DocumentVariant, FieldValues, PdfBuilder};
//!
//! let fields = FieldValues::new()
//!     .with("firstName", "Олена")
//!     .with("lastName", "Коваль")
//!     .with("phone", "+380 67 123 45 67");
//! let document = create_document("cv", fields)?;
//! assert!(document.validate());
//!
//! let layout = document.print_layout_now();
//! PdfBuilder::new().render_to_file(&layout, document.export_file_name())?;
//! # Ok::<(), document_builder::DocumentError>(())
//! ```

pub mod builder;
pub mod clock;
pub mod documents;
pub mod elements;
pub mod error;
pub mod fields;
pub mod fonts;
pub mod html;
pub mod model;
pub mod registry;
pub mod richtext;

pub use builder::{PdfBuildError, PdfBuilder, RenderedPdf};
pub use clock::{Clock, FixedClock, SystemClock};
pub use documents::{Document, DocumentVariant, Letter, Protocol, Resume};
pub use error::{DocumentError, Result};
pub use fields::FieldValues;
pub use model::LayoutDocument;
pub use registry::{available_types, create_document, DocumentKind};
