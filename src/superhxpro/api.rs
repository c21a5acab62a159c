//! # API Facade
//!
//! A thin facade over the command layer and the single entry point for every
//! operation, whatever the UI.
//!
//! The facade dispatches to the matching command, parses raw inputs (tag lists,
//! JSON queries) into typed values, and applies configuration such as the hash
//! chunk size and symlink policy. It does no printing and holds no business
//! logic; both live elsewhere (`cli` and `commands/*.rs`).
//!
//! `HelperApi<S: SidecarStore>` is generic over the store:
//! - Production: `HelperApi<FsStore>`
//! - Testing: `HelperApi<InMemoryStore>`

use crate::commands::{self, CmdResult, DedupeMode};
use crate::commands::tag::TagDelta;
use crate::config::HelperConfig;
use crate::error::Result;
use crate::query::Query;
use crate::store::SidecarStore;
use crate::walker::Depth;
use std::path::Path;

pub struct HelperApi<S: SidecarStore> {
    store: S,
    config: HelperConfig,
}

impl<S: SidecarStore> HelperApi<S> {
    pub fn new(store: S, config: HelperConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &HelperConfig {
        &self.config
    }

    /// Add and remove comma-separated tags on a file or the files of a folder.
    pub fn tag(&self, path: &Path, add: &str, remove: &str, recursive: bool) -> Result<CmdResult> {
        let delta = TagDelta::parse(add, remove);
        commands::tag::run(
            &self.store,
            path,
            &delta,
            Depth::from_recursive(recursive),
            self.config.follow_links,
        )
    }

    pub fn search_tag(&self, folder: &Path, tag: &str) -> Result<CmdResult> {
        commands::search::by_tag(&self.store, folder, tag.trim(), self.config.follow_links)
    }

    /// Parse `json_query` and search `folder` with it.
    pub fn search_meta(&self, folder: &Path, json_query: &str) -> Result<CmdResult> {
        let query = Query::parse(json_query)?;
        commands::search::meta(&self.store, folder, &query, self.config.follow_links)
    }

    pub fn export_map(&self, folder: &Path, output: &Path) -> Result<CmdResult> {
        commands::catalog::export(&self.store, folder, output, self.config.follow_links)
    }

    pub fn deduplicate(&self, folder: &Path, mode: DedupeMode) -> Result<CmdResult> {
        commands::dedupe::run(
            &self.store,
            folder,
            mode,
            self.config.hash_chunk_size,
            self.config.follow_links,
        )
    }

    pub fn health_check(&self, folder: &Path) -> Result<CmdResult> {
        commands::health::run(&self.store, folder, self.config.follow_links)
    }

    pub fn set_folder_mood(&self, folder: &Path, mood: &str, name: Option<&str>) -> Result<CmdResult> {
        commands::mood::set(&self.store, folder, mood, name)
    }

    pub fn get_folder_mood(
        &self,
        folder: &Path,
        recursive: bool,
        filter: Option<&str>,
    ) -> Result<CmdResult> {
        commands::mood::get(&self.store, folder, recursive, filter, self.config.follow_links)
    }
}
