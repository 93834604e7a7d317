//! Constants used throughout the channeldb library.
//!
//! These define the path syntax and the physical storage-key encoding.

/// Separator between path segments.
pub const SEPARATOR: char = '/';

/// The root path. The root record always exists implicitly.
pub const ROOT: &str = "/";

/// Reserved delimiter framing the channel inside a storage key.
///
/// Storage keys have the form `!<channel>!<key>`. The delimiter may never
/// appear in a user-supplied path.
pub const DELIMITER: char = '!';

/// Maximal sentinel used as +infinity for open-ended upper scan bounds.
///
/// `char::MAX` encodes to the greatest leading UTF-8 byte, so any bound of
/// the form `prefix + SENTINEL` sorts after every valid key sharing `prefix`.
/// Like the delimiter, it is rejected in user paths.
pub const SENTINEL: char = char::MAX;
