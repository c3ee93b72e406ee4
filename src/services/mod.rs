//! Services module - the upload pipeline.
//!
//! Everything here is **framework-agnostic**: no terminal, no GUI, no
//! YouTube client. Those sit behind the seams in [`uploader`] and are handed
//! in by whoever drives a run.
//!
//! # Components
//!
//! - [`naming`]: pure text transforms. Rule application, title and
//!   description composition, thumbnail matching and platform limit checks.
//! - [`discovery`]: lists the source directory and selects the media files
//!   for one batch, in a deterministic order.
//! - [`UploadSession`]: drives one run. Discovers files, builds an
//!   [`UploadItem`](crate::models::UploadItem) per file, asks the operator
//!   when interactive, uploads, and reports progress over the bridge.
//! - [`CommandUploader`]: an [`Uploader`] that hands each item to an
//!   external engine command.
//!
//! # Usage Example
//!
//! ```ignore
//! use ytbulk::services::{CommandUploader, UploadSession};
//! use ytbulk::ui::progress_channel;
//!
//! let (events, mut progress) = progress_channel();
//! let uploader = CommandUploader::new("youtube-upload-engine", Duration::from_secs(300));
//!
//! let handle = UploadSession::new(config, Arc::new(uploader), events)
//!     .spawn(runtime.handle());
//!
//! while let Some(event) = progress.blocking_recv() {
//!     println!("{}", event);
//! }
//! let summary = runtime.block_on(handle.join())?;
//! ```

pub mod command_uploader;
pub mod discovery;
pub mod naming;
pub mod session;
pub mod uploader;

pub use command_uploader::CommandUploader;
pub use discovery::{DiscoveryError, discover, list_files};
pub use session::{CancelSignal, RunError, RunHandle, UploadSession};
pub use crate::models::{UploadError, UploadErrorKind};
pub use uploader::{
    Confirmation, Confirmer, FsTemplateLoader, InlineTemplate, TemplateLoader, Uploader,
};
