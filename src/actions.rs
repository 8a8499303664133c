//! Consumer actions: the only readers of asset state.
//!
//! Each action resolves an asset through the store and hands the outcome to
//! the host [`Shell`]. When the resume is absent, view and download turn
//! into a prompt to pick one instead.
use crate::asset::{AssetKind, AssetRecord};
use crate::config::SiteConfig;
use crate::storage::Storage;
use crate::store::{AssetStore, ResolvedAsset};

/// The hosting UI, as seen by the actions.
pub trait Shell {
    /// Open a resolved asset in a new viewing context.
    fn open(&mut self, asset: &ResolvedAsset);

    /// Offer a resolved asset for saving under `filename`.
    fn save_as(&mut self, asset: &ResolvedAsset, filename: &str);

    /// Show the file picker for `kind`, restricted to `accept`.
    fn pick_file(&mut self, kind: AssetKind, accept: &str);

    /// Tear the page down and load it again from storage.
    fn reload(&mut self);
}

/// What an action ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Opened,
    Saved,
    PickerShown,
}

pub fn view<S, H>(
    store: &AssetStore<S>,
    kind: AssetKind,
    shell: &mut H,
) -> Outcome
where
    S: Storage,
    H: Shell + ?Sized,
{
    match store.resolve(kind) {
        ResolvedAsset::Absent => prompt_upload(kind, shell),
        resolved => {
            log::debug!("opening {} in a new context", kind);
            shell.open(&resolved);
            Outcome::Opened
        }
    }
}

pub fn download_resume<S, H>(
    store: &AssetStore<S>,
    config: &SiteConfig,
    shell: &mut H,
) -> Outcome
where
    S: Storage,
    H: Shell + ?Sized,
{
    match store.resolve(AssetKind::Resume) {
        ResolvedAsset::Absent => prompt_upload(AssetKind::Resume, shell),
        resolved => {
            shell.save_as(&resolved, &config.resume_filename());
            Outcome::Saved
        }
    }
}

/// Image source for the profile photo. The raw stored value is used when
/// the override cannot be decoded.
pub fn render_photo<S: Storage>(store: &AssetStore<S>) -> Option<String> {
    store
        .resolve(AssetKind::Photo)
        .as_source()
        .map(str::to_owned)
}

pub fn prompt_upload<H>(kind: AssetKind, shell: &mut H) -> Outcome
where
    H: Shell + ?Sized,
{
    shell.pick_file(kind, kind.accept());
    Outcome::PickerShown
}

/// Whether the page has any resume to offer, configured or uploaded.
pub fn has_resume<S: Storage>(store: &AssetStore<S>) -> bool {
    !matches!(store.record(AssetKind::Resume), AssetRecord::Absent)
}
