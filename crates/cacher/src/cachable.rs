use serde::Serialize;

use crate::error::BoxError;

/// A value the cacher can persist.
///
/// The file name is the key the value is stored and loaded under. It must be
/// a single path component, unique within one cacher's root.
pub trait Cachable {
    /// Name of the file this value is stored in.
    fn file_name(&self) -> String;

    /// Encode the value to the bytes written to disk.
    fn transform(&self) -> Result<Vec<u8>, BoxError>;
}

/// Opt-in JSON encoding for serde types.
///
/// Implementing this supplies only the file name; [`Cachable::transform`]
/// encodes the whole value with `serde_json`. Types that need another format
/// implement [`Cachable`] directly instead.
///
/// ```
/// use cacher::{Cachable, JsonCachable};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Settings {
///     volume: u8,
/// }
///
/// impl JsonCachable for Settings {
///     fn file_name(&self) -> String {
///         "settings.json".into()
///     }
/// }
///
/// let bytes = Settings { volume: 7 }.transform().unwrap();
/// assert_eq!(bytes, br#"{"volume":7}"#);
/// ```
pub trait JsonCachable: Serialize {
    /// Name of the file this value is stored in.
    fn file_name(&self) -> String;
}

impl<T: JsonCachable> Cachable for T {
    fn file_name(&self) -> String {
        JsonCachable::file_name(self)
    }

    fn transform(&self) -> Result<Vec<u8>, BoxError> {
        Ok(serde_json::to_vec(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use serde::Serializer;

    #[derive(Serialize)]
    struct Note {
        id: u32,
        body: String,
    }

    impl JsonCachable for Note {
        fn file_name(&self) -> String {
            format!("note-{}.json", self.id)
        }
    }

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("refusing to serialize"))
        }
    }

    impl JsonCachable for Unencodable {
        fn file_name(&self) -> String {
            "never.json".into()
        }
    }

    struct Raw(&'static [u8]);

    impl Cachable for Raw {
        fn file_name(&self) -> String {
            "raw.bin".into()
        }

        fn transform(&self) -> Result<Vec<u8>, BoxError> {
            Ok(self.0.to_vec())
        }
    }

    #[test]
    fn json_default_encodes_whole_value() {
        let note = Note { id: 3, body: "hi".into() };
        assert_eq!(Cachable::file_name(&note), "note-3.json");
        assert_eq!(note.transform().unwrap(), br#"{"id":3,"body":"hi"}"#);
    }

    #[test]
    fn json_default_propagates_encode_errors() {
        let err = Unencodable.transform().unwrap_err();
        assert!(err.to_string().contains("refusing to serialize"));
        assert!(err.downcast_ref::<serde_json::Error>().is_some());
    }

    #[test]
    fn direct_impl_overrides_encoding() {
        assert_eq!(Raw(b"\x00\x01").transform().unwrap(), vec![0, 1]);
    }
}
