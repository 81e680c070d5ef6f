//! Lazy loader for the engine descriptions of the preferences page.
//!
//! The page marks each engine row with its name. The first time the user
//! hovers any of them, the loader fetches `engine_descriptions.json` once and
//! appends the description and its source to every matching element. The
//! page itself is reached only through the [`Host`] trait, so the loader can
//! run against a real DOM binding or a fake.
//!
//! ```text
//! Unloaded --hover--> Loading --response--> Loaded
//!     ^                  |
//!     +----- failure ----+
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::DescriptionError;

/// Relative path of the descriptions resource on the serving origin.
pub const RESOURCE: &str = "engine_descriptions.json";

/// The only endpoint the loader activates on.
pub const ENDPOINT: &str = "preferences";

/// Capabilities the loader needs from the page.
pub trait Host {
    type Element: Clone;

    /// Name of the current page endpoint.
    fn endpoint(&self) -> &str;

    /// Elements carrying an engine-name marker.
    fn marked_elements(&self) -> Vec<Self::Element>;

    /// Routes hover events of `element` to [`DescriptionLoader::hover`].
    fn subscribe_hover(&mut self, element: &Self::Element);

    /// Issues an unauthenticated GET for `path`. The response is handed back
    /// through [`DescriptionLoader::receive`].
    fn fetch(&mut self, path: &str);

    /// Description slots of the rows marked with `engine`.
    fn query(&self, engine: &str) -> Vec<Self::Element>;

    fn append_text(&mut self, element: &Self::Element, text: &str);

    fn append_italic(&mut self, element: &Self::Element, text: &str);
}

/// Description text and source label of one engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Description(pub String, pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoaderState {
    #[default]
    Unloaded,
    Loading,
    Loaded,
}

#[derive(Debug)]
pub struct DescriptionLoader {
    state: LoaderState,
    source_label: String,
}

impl DescriptionLoader {
    /// `source_label` is the translated word used to cite the source,
    /// e.g. `"Source"`.
    pub fn new(source_label: impl Into<String>) -> Self {
        Self {
            state: LoaderState::Unloaded,
            source_label: source_label.into(),
        }
    }

    pub fn state(&self) -> LoaderState {
        self.state
    }

    /// Subscribes to hover events of every marked element. Returns `false`
    /// without touching the page outside the preferences endpoint.
    pub fn attach<H: Host>(&self, host: &mut H) -> bool {
        if host.endpoint() != ENDPOINT {
            return false;
        }

        for element in host.marked_elements() {
            host.subscribe_hover(&element);
        }
        true
    }

    /// Handles a hover event. Only the first one while unloaded fetches.
    pub fn hover<H: Host>(&mut self, host: &mut H) {
        if self.state != LoaderState::Unloaded {
            return;
        }

        self.state = LoaderState::Loading;
        tracing::debug!("fetching {}", RESOURCE);
        host.fetch(RESOURCE);
    }

    /// Completes the outstanding fetch with the response body, or with the
    /// reason it failed.
    ///
    /// On failure the loader goes back to [`LoaderState::Unloaded`], so the
    /// next hover fetches again.
    pub fn receive<H: Host>(
        &mut self,
        response: Result<&str, String>,
        host: &mut H,
    ) -> Result<(), DescriptionError> {
        if self.state != LoaderState::Loading {
            tracing::warn!("ignoring unexpected descriptions response");
            return Ok(());
        }

        let descriptions = match response
            .map_err(DescriptionError::Fetch)
            .and_then(|body| Ok(serde_json::from_str::<BTreeMap<String, Description>>(body)?))
        {
            Ok(descriptions) => descriptions,
            Err(err) => {
                self.state = LoaderState::Unloaded;
                return Err(err);
            }
        };

        for (engine, Description(text, source)) in &descriptions {
            let citation = format!("{}:\u{a0}{}", self.source_label, source);
            for element in host.query(engine) {
                host.append_text(&element, &format!("{text} "));
                host.append_italic(&element, &citation);
            }
        }

        self.state = LoaderState::Loaded;
        Ok(())
    }
}
