//! Riak objects: identifiers, values, metadata, and siblings.

use bytes::Bytes;
use riak_core::protocol::messages::{RpbContent, RpbLink, RpbPair};
use riak_core::{Result, RiakError};

/// Identifies an object: `(bucket type, bucket, key)`.
///
/// The bucket type is absent when targeting the default type (or an older
/// server). Components must be non-empty and must not contain `/`;
/// violations are reported as validation errors before any request is
/// sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RiakObjectId {
    /// Optional bucket type.
    pub bucket_type: Option<String>,
    /// Bucket name.
    pub bucket: String,
    /// Object key.
    pub key: String,
}

impl RiakObjectId {
    /// Creates an identifier in the default bucket type.
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket_type: None,
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Creates an identifier in the given bucket type.
    pub fn with_type(
        bucket_type: impl Into<String>,
        bucket: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            bucket_type: Some(bucket_type.into()),
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Validates all components.
    pub fn validate(&self) -> Result<()> {
        if let Some(t) = &self.bucket_type {
            validate_component("bucket type", t)?;
        }
        validate_component("bucket", &self.bucket)?;
        validate_component("key", &self.key)
    }

    /// Returns the bucket type as bytes for the wire, if present.
    pub(crate) fn type_bytes(&self) -> Option<Bytes> {
        self.bucket_type
            .as_ref()
            .map(|t| Bytes::copy_from_slice(t.as_bytes()))
    }

    /// Returns the bucket as bytes for the wire.
    pub(crate) fn bucket_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(self.bucket.as_bytes())
    }

    /// Returns the key as bytes for the wire.
    pub(crate) fn key_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(self.key.as_bytes())
    }
}

impl std::fmt::Display for RiakObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.bucket_type {
            Some(t) => write!(f, "{}/{}/{}", t, self.bucket, self.key),
            None => write!(f, "{}/{}", self.bucket, self.key),
        }
    }
}

/// Validates a bucket-type, bucket, or key component.
pub(crate) fn validate_component(name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(RiakError::Validation(format!("{} cannot be empty", name)));
    }
    if value.contains('/') {
        return Err(RiakError::Validation(format!(
            "{} cannot contain a forward slash: {:?}",
            name, value
        )));
    }
    Ok(())
}

/// A Riak object: identifier, value bytes, content metadata, the causal
/// vector the server attached, and any siblings.
///
/// The causal vector is opaque; echo it on a subsequent put or delete to
/// express "I saw this version". Siblings are non-empty only when the
/// server returned more than one content for the key, in which case the
/// first content is materialized as the primary value and `siblings`
/// holds every content (primary included), all sharing one causal vector.
#[derive(Debug, Clone, PartialEq)]
pub struct RiakObject {
    /// The object's identifier.
    pub id: RiakObjectId,
    /// The value bytes.
    pub value: Bytes,
    /// MIME content type.
    pub content_type: Option<String>,
    /// Character set.
    pub charset: Option<String>,
    /// Content encoding.
    pub content_encoding: Option<String>,
    /// Server-assigned entity tag.
    pub vtag: Option<String>,
    /// Last-modified time, seconds part.
    pub last_modified: Option<u32>,
    /// Last-modified time, microseconds part.
    pub last_modified_usecs: Option<u32>,
    /// User metadata pairs.
    pub user_meta: Vec<RpbPair>,
    /// Secondary index entries.
    pub indexes: Vec<RpbPair>,
    /// Links to other objects.
    pub links: Vec<RpbLink>,
    /// Opaque causal vector for this version, if known.
    pub vclock: Option<Bytes>,
    /// Concurrent values for this key, when the server returned several.
    pub siblings: Vec<RiakObject>,
}

impl RiakObject {
    /// Creates an object with the given identifier and value.
    pub fn new(id: RiakObjectId, value: impl Into<Bytes>) -> Self {
        Self {
            id,
            value: value.into(),
            content_type: None,
            charset: None,
            content_encoding: None,
            vtag: None,
            last_modified: None,
            last_modified_usecs: None,
            user_meta: Vec::new(),
            indexes: Vec::new(),
            links: Vec::new(),
            vclock: None,
            siblings: Vec::new(),
        }
    }

    /// Sets the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets the causal vector to echo on the next write.
    pub fn with_vclock(mut self, vclock: impl Into<Bytes>) -> Self {
        self.vclock = Some(vclock.into());
        self
    }

    /// Returns `true` when concurrent writes left multiple values.
    pub fn has_siblings(&self) -> bool {
        !self.siblings.is_empty()
    }

    /// Builds the wire content record for this object.
    pub(crate) fn to_content(&self) -> RpbContent {
        RpbContent {
            value: self.value.clone(),
            content_type: self
                .content_type
                .as_ref()
                .map(|s| Bytes::copy_from_slice(s.as_bytes())),
            charset: self
                .charset
                .as_ref()
                .map(|s| Bytes::copy_from_slice(s.as_bytes())),
            content_encoding: self
                .content_encoding
                .as_ref()
                .map(|s| Bytes::copy_from_slice(s.as_bytes())),
            vtag: None,
            links: self.links.clone(),
            last_mod: None,
            last_mod_usecs: None,
            usermeta: self.user_meta.clone(),
            indexes: self.indexes.clone(),
            deleted: None,
        }
    }

    /// Materializes one wire content as an object.
    fn from_content(id: RiakObjectId, content: &RpbContent, vclock: Bytes) -> Self {
        let as_string = |b: &Option<Bytes>| {
            b.as_ref()
                .map(|v| String::from_utf8_lossy(v).into_owned())
        };

        Self {
            id,
            value: content.value.clone(),
            content_type: as_string(&content.content_type),
            charset: as_string(&content.charset),
            content_encoding: as_string(&content.content_encoding),
            vtag: as_string(&content.vtag),
            last_modified: content.last_mod,
            last_modified_usecs: content.last_mod_usecs,
            user_meta: content.usermeta.clone(),
            indexes: content.indexes.clone(),
            links: content.links.clone(),
            vclock: Some(vclock),
            siblings: Vec::new(),
        }
    }

    /// Materializes a server response: the first content becomes the
    /// primary value; with more than one content, every content is also
    /// listed as a sibling sharing the response's causal vector.
    pub(crate) fn from_contents(
        id: &RiakObjectId,
        contents: &[RpbContent],
        vclock: Bytes,
    ) -> Result<Self> {
        let first = contents.first().ok_or_else(|| {
            RiakError::InvalidResponse("response carried a causal vector but no content".into())
        })?;

        let mut object = Self::from_content(id.clone(), first, vclock.clone());
        if contents.len() > 1 {
            object.siblings = contents
                .iter()
                .map(|content| Self::from_content(id.clone(), content, vclock.clone()))
                .collect();
        }
        Ok(object)
    }
}
