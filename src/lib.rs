//! Manimal renders the lesson animation clips used by the learning platform.
//!
//! A run walks a [`Catalog`] of topic -> scene file -> entry, narrowed by optional
//! [`SelectionCriteria`], and for each entry:
//!
//! - invokes an external [`Renderer`] (the `manim` CLI by default)
//! - moves the clip into the working output area
//!
//! After the batch the clips are copied into the publish directory and a [`Manifest`] of what is
//! published is written next to them.
#![forbid(unsafe_code)]

mod foundation;

pub mod catalog;
pub mod driver;
pub mod generate;
pub mod manifest;
pub mod publish;
pub mod render;
pub mod select;

pub use crate::catalog::{Catalog, EntryRef, FileEntries};
pub use crate::driver::{DriverConfig, RunOutcome, RunReport, run};
pub use crate::foundation::error::{ManimalError, ManimalResult};
pub use crate::generate::{EntryFailure, OutputLayout, generate_entry};
pub use crate::manifest::{MANIFEST_FILE, Manifest, ManifestOutcome, write_manifest};
pub use crate::publish::{CopyFailure, PublishOutcome, sync_publish};
pub use crate::render::{
    ManimRenderer, Quality, RENDERER_MEDIA_DIR, RenderRequest, Renderer, RendererConfig, VIDEO_EXT,
    clip_file_name, manim_output_path,
};
pub use crate::select::{Selection, SelectionCriteria, Unresolved};
