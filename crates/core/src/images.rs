//! Images
//!
//! Display handles for raw image buffers. A handle is an opaque `blob:` URL that a view can
//! render; it stays valid until it is revoked.

use std::{
    fmt::{self, Display, Formatter},
    sync::{Arc, Mutex, PoisonError},
};

use slotmap::{Key, KeyData, SlotMap, new_key_type};

use crate::watches::ImageBytes;

new_key_type! {
    /// Image Key
    pub struct ImageKey;
}

/// Prefix of every handle minted by [`ImageHandles`].
pub const HANDLE_PREFIX: &str = "blob:vitrine/";

/// Content type used when the bytes do not match a known signature.
pub const FALLBACK_CONTENT_TYPE: &str = "image/jpeg";

/// Guess the content type of an encoded image from its leading bytes.
#[must_use]
pub fn sniff_content_type(bytes: &[u8]) -> &'static str {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        _ => FALLBACK_CONTENT_TYPE,
    }
}

/// A renderable handle for one image buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisplayHandle(String);

impl DisplayHandle {
    fn for_key(key: ImageKey) -> Self {
        Self(format!("{HANDLE_PREFIX}{:016x}", key.data().as_ffi()))
    }

    /// The handle URL.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DisplayHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DisplayHandle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A live image behind a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedImage<'a> {
    /// Encoded image bytes.
    pub bytes: &'a [u8],

    /// Sniffed content type.
    pub content_type: &'static str,
}

#[derive(Debug)]
struct ImageEntry {
    bytes: ImageBytes,
    content_type: &'static str,
}

/// Registry of live display handles.
#[derive(Debug, Default)]
pub struct ImageHandles {
    entries: SlotMap<ImageKey, ImageEntry>,
}

impl ImageHandles {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a new handle for `bytes`. Every call creates a distinct handle, even for
    /// identical buffers.
    pub fn create(&mut self, bytes: impl Into<ImageBytes>) -> DisplayHandle {
        let bytes = bytes.into();
        let content_type = sniff_content_type(&bytes);

        let key = self.entries.insert(ImageEntry {
            bytes,
            content_type,
        });

        DisplayHandle::for_key(key)
    }

    /// Release a handle.
    ///
    /// Only URLs carrying this registry's prefix and naming a live entry are released.
    /// Anything else (remote URLs, already revoked handles, garbage) is ignored and
    /// reported as `false`.
    pub fn revoke(&mut self, url: &str) -> bool {
        parse_key(url).is_some_and(|key| self.entries.remove(key).is_some())
    }

    /// Look up the image behind a live handle.
    #[must_use]
    pub fn resolve(&self, url: &str) -> Option<ResolvedImage<'_>> {
        let entry = self.entries.get(parse_key(url)?)?;

        Some(ResolvedImage {
            bytes: &entry.bytes,
            content_type: entry.content_type,
        })
    }

    /// Number of live handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no handle is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_key(url: &str) -> Option<ImageKey> {
    let hex = url.strip_prefix(HANDLE_PREFIX)?;
    let key: ImageKey = KeyData::from_ffi(u64::from_str_radix(hex, 16).ok()?).into();

    (DisplayHandle::for_key(key).as_str() == url).then_some(key)
}

/// A registry shared between views, handing out leases that release themselves.
#[derive(Debug, Clone, Default)]
pub struct SharedImageHandles {
    inner: Arc<Mutex<ImageHandles>>,
}

impl SharedImageHandles {
    /// Create an empty shared registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a handle that is revoked when the returned lease is dropped.
    #[must_use]
    pub fn lease(&self, bytes: impl Into<ImageBytes>) -> ImageLease {
        let handle = self.with(|handles| handles.create(bytes));

        ImageLease {
            handles: self.clone(),
            handle,
        }
    }

    /// Run `f` against the registry.
    pub fn with<R>(&self, f: impl FnOnce(&mut ImageHandles) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        f(&mut guard)
    }

    /// Content type of a live handle.
    #[must_use]
    pub fn content_type(&self, url: &str) -> Option<&'static str> {
        self.with(|handles| handles.resolve(url).map(|image| image.content_type))
    }

    /// Number of live handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.with(|handles| handles.len())
    }

    /// Whether no handle is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A display handle that is revoked on drop.
#[derive(Debug)]
pub struct ImageLease {
    handles: SharedImageHandles,
    handle: DisplayHandle,
}

impl ImageLease {
    /// The leased handle.
    #[must_use]
    pub fn handle(&self) -> &DisplayHandle {
        &self.handle
    }
}

impl Drop for ImageLease {
    fn drop(&mut self) {
        self.handles.with(|handles| handles.revoke(self.handle.as_str()));
    }
}

/// Carousel cursor over a watch's images. Moving past either end wraps around.
#[derive(Debug, Clone, Copy)]
pub struct Gallery<'a> {
    images: &'a [ImageBytes],
    index: usize,
}

impl<'a> Gallery<'a> {
    /// Start at the main image.
    #[must_use]
    pub fn new(images: &'a [ImageBytes]) -> Self {
        Self { images, index: 0 }
    }

    /// Position of the current image.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether there is nothing to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// The current image, if any.
    #[must_use]
    pub fn current(&self) -> Option<&'a [u8]> {
        self.images.get(self.index).map(Vec::as_slice)
    }

    /// Advance, wrapping to the first image after the last.
    pub fn show_next(&mut self) {
        if !self.images.is_empty() {
            self.index = (self.index + 1) % self.images.len();
        }
    }

    /// Step back, wrapping to the last image before the first.
    pub fn show_previous(&mut self) {
        if !self.images.is_empty() {
            self.index = self
                .index
                .checked_sub(1)
                .unwrap_or(self.images.len() - 1);
        }
    }

    /// Jump to a thumbnail. Out of range positions are ignored.
    pub fn select(&mut self, index: usize) {
        if index < self.images.len() {
            self.index = index;
        }
    }
}
