//! Per-operation request options.
//!
//! Each operation kind has a plain value record with optional fields and
//! fluent setters; `populate` writes only the fields the caller set onto
//! the outgoing request. Quorum knobs use [`Quorum`], which encodes
//! Riak's symbolic values alongside literal counts.

use std::time::Duration;

use bytes::Bytes;
use riak_core::protocol::messages::{
    DtFetchReq, DtUpdateReq, RpbCounterGetReq, RpbCounterUpdateReq, RpbDelReq, RpbGetReq,
    RpbIndexReq, RpbPutReq, RpbSearchQueryReq,
};

/// A quorum requirement for reads or writes.
///
/// The symbolic variants map to Riak's reserved magic values near
/// `u32::MAX`; `Count` is a literal number of replicas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quorum {
    /// One replica.
    One,
    /// A majority of replicas.
    Quorum,
    /// All replicas.
    All,
    /// The bucket's default.
    Default,
    /// An explicit replica count.
    Count(u32),
}

const QUORUM_ONE: u32 = u32::MAX - 1;
const QUORUM_QUORUM: u32 = u32::MAX - 2;
const QUORUM_ALL: u32 = u32::MAX - 3;
const QUORUM_DEFAULT: u32 = u32::MAX - 4;

impl Quorum {
    /// Encodes this quorum as its wire value.
    pub fn as_u32(self) -> u32 {
        match self {
            Self::One => QUORUM_ONE,
            Self::Quorum => QUORUM_QUORUM,
            Self::All => QUORUM_ALL,
            Self::Default => QUORUM_DEFAULT,
            Self::Count(n) => n,
        }
    }

    /// Decodes a wire value.
    pub fn from_u32(value: u32) -> Self {
        match value {
            QUORUM_ONE => Self::One,
            QUORUM_QUORUM => Self::Quorum,
            QUORUM_ALL => Self::All,
            QUORUM_DEFAULT => Self::Default,
            n => Self::Count(n),
        }
    }
}

fn millis(timeout: Duration) -> u32 {
    timeout.as_millis().min(u32::MAX as u128) as u32
}

/// Options for get operations.
#[derive(Debug, Clone, Default)]
pub struct GetOptions {
    /// Read quorum.
    pub r: Option<Quorum>,
    /// Primary read quorum.
    pub pr: Option<Quorum>,
    /// Whether a quorum of not-founds short-circuits the read.
    pub basic_quorum: Option<bool>,
    /// Whether not-found replies count toward the read quorum.
    pub notfound_ok: Option<bool>,
    /// Return only metadata, no value.
    pub head: Option<bool>,
    /// Return the causal vector of tombstones.
    pub deleted_vclock: Option<bool>,
    /// Return nothing unless the object changed since this causal vector.
    pub if_modified: Option<Bytes>,
    /// Server-side timeout.
    pub timeout: Option<Duration>,
}

impl GetOptions {
    /// Sets the read quorum.
    pub fn r(mut self, q: Quorum) -> Self {
        self.r = Some(q);
        self
    }

    /// Sets the primary read quorum.
    pub fn pr(mut self, q: Quorum) -> Self {
        self.pr = Some(q);
        self
    }

    /// Requests a metadata-only read.
    pub fn head(mut self, head: bool) -> Self {
        self.head = Some(head);
        self
    }

    /// Sets the server-side timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub(crate) fn populate(&self, req: &mut RpbGetReq) {
        req.r = self.r.map(Quorum::as_u32);
        req.pr = self.pr.map(Quorum::as_u32);
        req.basic_quorum = self.basic_quorum;
        req.notfound_ok = self.notfound_ok;
        req.head = self.head;
        req.deletedvclock = self.deleted_vclock;
        req.if_modified = self.if_modified.clone();
        req.timeout = self.timeout.map(millis);
    }
}

/// Options for put operations.
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    /// Write quorum.
    pub w: Option<Quorum>,
    /// Durable write quorum.
    pub dw: Option<Quorum>,
    /// Primary write quorum.
    pub pw: Option<Quorum>,
    /// Echo the stored object (with any siblings) in the response.
    pub return_body: Option<bool>,
    /// Echo only the stored object's metadata.
    pub return_head: Option<bool>,
    /// Store only if the echoed causal vector still matches.
    pub if_not_modified: Option<bool>,
    /// Store only if the key does not exist.
    pub if_none_match: Option<bool>,
    /// Server-side timeout.
    pub timeout: Option<Duration>,
}

impl PutOptions {
    /// Sets the write quorum.
    pub fn w(mut self, q: Quorum) -> Self {
        self.w = Some(q);
        self
    }

    /// Sets the durable write quorum.
    pub fn dw(mut self, q: Quorum) -> Self {
        self.dw = Some(q);
        self
    }

    /// Requests the stored object back in the response.
    pub fn return_body(mut self, return_body: bool) -> Self {
        self.return_body = Some(return_body);
        self
    }

    /// Sets the server-side timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub(crate) fn populate(&self, req: &mut RpbPutReq) {
        req.w = self.w.map(Quorum::as_u32);
        req.dw = self.dw.map(Quorum::as_u32);
        req.pw = self.pw.map(Quorum::as_u32);
        req.return_body = self.return_body;
        req.return_head = self.return_head;
        req.if_not_modified = self.if_not_modified;
        req.if_none_match = self.if_none_match;
        req.timeout = self.timeout.map(millis);
    }
}

/// Options for delete operations.
#[derive(Debug, Clone, Default)]
pub struct DeleteOptions {
    /// Symbolic read-write quorum.
    pub rw: Option<Quorum>,
    /// Read quorum.
    pub r: Option<Quorum>,
    /// Write quorum.
    pub w: Option<Quorum>,
    /// Primary read quorum.
    pub pr: Option<Quorum>,
    /// Primary write quorum.
    pub pw: Option<Quorum>,
    /// Durable write quorum.
    pub dw: Option<Quorum>,
    /// Causal vector of the version being deleted.
    pub vclock: Option<Bytes>,
    /// Server-side timeout.
    pub timeout: Option<Duration>,
}

impl DeleteOptions {
    /// Sets the read-write quorum.
    pub fn rw(mut self, q: Quorum) -> Self {
        self.rw = Some(q);
        self
    }

    /// Sets the causal vector to echo.
    pub fn vclock(mut self, vclock: impl Into<Bytes>) -> Self {
        self.vclock = Some(vclock.into());
        self
    }

    /// Sets the server-side timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub(crate) fn populate(&self, req: &mut RpbDelReq) {
        req.rw = self.rw.map(Quorum::as_u32);
        req.r = self.r.map(Quorum::as_u32);
        req.w = self.w.map(Quorum::as_u32);
        req.pr = self.pr.map(Quorum::as_u32);
        req.pw = self.pw.map(Quorum::as_u32);
        req.dw = self.dw.map(Quorum::as_u32);
        req.vclock = self.vclock.clone();
        req.timeout = self.timeout.map(millis);
    }
}

/// Options for secondary index queries.
#[derive(Debug, Clone, Default)]
pub struct IndexOptions {
    /// Return matched terms alongside keys.
    pub return_terms: Option<bool>,
    /// Page size; a continuation is returned when more results remain.
    pub max_results: Option<u32>,
    /// Continuation token from a previous page.
    pub continuation: Option<Bytes>,
    /// Filter terms by this regular expression.
    pub term_regex: Option<Bytes>,
    /// Sort results before paginating.
    pub pagination_sort: Option<bool>,
    /// Server-side timeout.
    pub timeout: Option<Duration>,
}

impl IndexOptions {
    /// Requests matched terms alongside keys.
    pub fn return_terms(mut self, return_terms: bool) -> Self {
        self.return_terms = Some(return_terms);
        self
    }

    /// Sets the page size.
    pub fn max_results(mut self, max: u32) -> Self {
        self.max_results = Some(max);
        self
    }

    /// Continues a previous page.
    pub fn continuation(mut self, continuation: impl Into<Bytes>) -> Self {
        self.continuation = Some(continuation.into());
        self
    }

    pub(crate) fn populate(&self, req: &mut RpbIndexReq) {
        req.return_terms = self.return_terms;
        req.max_results = self.max_results;
        req.continuation = self.continuation.clone();
        req.term_regex = self.term_regex.clone();
        req.pagination_sort = self.pagination_sort;
        req.timeout = self.timeout.map(millis);
    }
}

/// Options for search queries.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Maximum rows to return.
    pub rows: Option<u32>,
    /// Offset of the first row.
    pub start: Option<u32>,
    /// Sort clause.
    pub sort: Option<Bytes>,
    /// Filter query applied after the main query.
    pub filter: Option<Bytes>,
    /// Default field for unqualified terms.
    pub default_field: Option<Bytes>,
    /// Default operator (`and` / `or`) between terms.
    pub default_op: Option<Bytes>,
    /// Restrict returned fields to these.
    pub return_fields: Vec<Bytes>,
    /// Presort results by `key` or `score`.
    pub presort: Option<Bytes>,
}

impl SearchOptions {
    /// Sets the maximum number of rows.
    pub fn rows(mut self, rows: u32) -> Self {
        self.rows = Some(rows);
        self
    }

    /// Sets the offset of the first row.
    pub fn start(mut self, start: u32) -> Self {
        self.start = Some(start);
        self
    }

    pub(crate) fn populate(&self, req: &mut RpbSearchQueryReq) {
        req.rows = self.rows;
        req.start = self.start;
        req.sort = self.sort.clone();
        req.filter = self.filter.clone();
        req.df = self.default_field.clone();
        req.op = self.default_op.clone();
        req.fl = self.return_fields.clone();
        req.presort = self.presort.clone();
    }
}

/// Options for CRDT fetches.
#[derive(Debug, Clone, Default)]
pub struct DtFetchOptions {
    /// Read quorum.
    pub r: Option<Quorum>,
    /// Primary read quorum.
    pub pr: Option<Quorum>,
    /// Whether a quorum of not-founds short-circuits the read.
    pub basic_quorum: Option<bool>,
    /// Whether not-found replies count toward the read quorum.
    pub notfound_ok: Option<bool>,
    /// Ask the server for the opaque causal context.
    pub include_context: Option<bool>,
    /// Server-side timeout.
    pub timeout: Option<Duration>,
}

impl DtFetchOptions {
    /// Sets the read quorum.
    pub fn r(mut self, q: Quorum) -> Self {
        self.r = Some(q);
        self
    }

    /// Asks for (or suppresses) the causal context.
    pub fn include_context(mut self, include: bool) -> Self {
        self.include_context = Some(include);
        self
    }

    pub(crate) fn populate(&self, req: &mut DtFetchReq) {
        req.r = self.r.map(Quorum::as_u32);
        req.pr = self.pr.map(Quorum::as_u32);
        req.basic_quorum = self.basic_quorum;
        req.notfound_ok = self.notfound_ok;
        req.include_context = self.include_context;
        req.timeout = self.timeout.map(millis);
    }
}

/// Options for CRDT updates.
#[derive(Debug, Clone, Default)]
pub struct DtUpdateOptions {
    /// Write quorum.
    pub w: Option<Quorum>,
    /// Durable write quorum.
    pub dw: Option<Quorum>,
    /// Primary write quorum.
    pub pw: Option<Quorum>,
    /// Echo the post-update value in the response.
    pub return_body: Option<bool>,
    /// Ask the server for the new causal context.
    pub include_context: Option<bool>,
    /// Causal context observed by the most recent fetch. Required for
    /// updates that remove elements.
    pub context: Option<Bytes>,
    /// Server-side timeout.
    pub timeout: Option<Duration>,
}

impl DtUpdateOptions {
    /// Sets the write quorum.
    pub fn w(mut self, q: Quorum) -> Self {
        self.w = Some(q);
        self
    }

    /// Requests the post-update value.
    pub fn return_body(mut self, return_body: bool) -> Self {
        self.return_body = Some(return_body);
        self
    }

    /// Echoes a fetched causal context.
    pub fn context(mut self, context: impl Into<Bytes>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub(crate) fn populate(&self, req: &mut DtUpdateReq) {
        req.w = self.w.map(Quorum::as_u32);
        req.dw = self.dw.map(Quorum::as_u32);
        req.pw = self.pw.map(Quorum::as_u32);
        req.return_body = self.return_body;
        req.include_context = self.include_context;
        req.context = self.context.clone();
        req.timeout = self.timeout.map(millis);
    }
}

/// Options for legacy counter updates.
#[derive(Debug, Clone, Default)]
pub struct CounterUpdateOptions {
    /// Write quorum.
    pub w: Option<Quorum>,
    /// Durable write quorum.
    pub dw: Option<Quorum>,
    /// Primary write quorum.
    pub pw: Option<Quorum>,
    /// Return the post-update value.
    pub return_value: Option<bool>,
}

impl CounterUpdateOptions {
    /// Requests the post-update value.
    pub fn return_value(mut self, return_value: bool) -> Self {
        self.return_value = Some(return_value);
        self
    }

    pub(crate) fn populate(&self, req: &mut RpbCounterUpdateReq) {
        req.w = self.w.map(Quorum::as_u32);
        req.dw = self.dw.map(Quorum::as_u32);
        req.pw = self.pw.map(Quorum::as_u32);
        req.returnvalue = self.return_value;
    }
}

/// Options for legacy counter reads.
#[derive(Debug, Clone, Default)]
pub struct CounterGetOptions {
    /// Read quorum.
    pub r: Option<Quorum>,
    /// Primary read quorum.
    pub pr: Option<Quorum>,
    /// Whether a quorum of not-founds short-circuits the read.
    pub basic_quorum: Option<bool>,
    /// Whether not-found replies count toward the read quorum.
    pub notfound_ok: Option<bool>,
}

impl CounterGetOptions {
    /// Sets the read quorum.
    pub fn r(mut self, q: Quorum) -> Self {
        self.r = Some(q);
        self
    }

    pub(crate) fn populate(&self, req: &mut RpbCounterGetReq) {
        req.r = self.r.map(Quorum::as_u32);
        req.pr = self.pr.map(Quorum::as_u32);
        req.basic_quorum = self.basic_quorum;
        req.notfound_ok = self.notfound_ok;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quorum_symbolic_encoding() {
        assert_eq!(Quorum::One.as_u32(), u32::MAX - 1);
        assert_eq!(Quorum::Quorum.as_u32(), u32::MAX - 2);
        assert_eq!(Quorum::All.as_u32(), u32::MAX - 3);
        assert_eq!(Quorum::Default.as_u32(), u32::MAX - 4);
        assert_eq!(Quorum::Count(3).as_u32(), 3);
    }

    #[test]
    fn test_quorum_roundtrip() {
        for q in [
            Quorum::One,
            Quorum::Quorum,
            Quorum::All,
            Quorum::Default,
            Quorum::Count(2),
        ] {
            assert_eq!(Quorum::from_u32(q.as_u32()), q);
        }
    }

    #[test]
    fn test_get_options_populate_only_set_fields() {
        let options = GetOptions::default().r(Quorum::Quorum).head(true);
        let mut req = RpbGetReq::default();
        options.populate(&mut req);

        assert_eq!(req.r, Some(u32::MAX - 2));
        assert_eq!(req.head, Some(true));
        assert!(req.pr.is_none());
        assert!(req.basic_quorum.is_none());
        assert!(req.timeout.is_none());
    }

    #[test]
    fn test_put_options_populate() {
        let options = PutOptions::default()
            .w(Quorum::All)
            .return_body(true)
            .timeout(Duration::from_secs(2));
        let mut req = RpbPutReq::default();
        options.populate(&mut req);

        assert_eq!(req.w, Some(u32::MAX - 3));
        assert_eq!(req.return_body, Some(true));
        assert_eq!(req.timeout, Some(2000));
        assert!(req.if_none_match.is_none());
    }

    #[test]
    fn test_delete_options_populate_vclock() {
        let options = DeleteOptions::default()
            .rw(Quorum::One)
            .vclock(Bytes::from_static(b"\x01"));
        let mut req = RpbDelReq::default();
        options.populate(&mut req);

        assert_eq!(req.rw, Some(u32::MAX - 1));
        assert_eq!(req.vclock, Some(Bytes::from_static(b"\x01")));
    }

    #[test]
    fn test_index_options_pagination() {
        let options = IndexOptions::default()
            .return_terms(true)
            .max_results(100)
            .continuation(Bytes::from_static(b"token"));
        let mut req = RpbIndexReq::default();
        options.populate(&mut req);

        assert_eq!(req.return_terms, Some(true));
        assert_eq!(req.max_results, Some(100));
        assert_eq!(req.continuation, Some(Bytes::from_static(b"token")));
    }

    #[test]
    fn test_dt_update_options_context() {
        let options = DtUpdateOptions::default()
            .return_body(true)
            .context(Bytes::from_static(b"ctx"));
        let mut req = DtUpdateReq::default();
        options.populate(&mut req);

        assert_eq!(req.return_body, Some(true));
        assert_eq!(req.context, Some(Bytes::from_static(b"ctx")));
        assert!(req.include_context.is_none());
    }

    #[test]
    fn test_counter_options_populate() {
        let update = CounterUpdateOptions::default().return_value(true);
        let mut req = RpbCounterUpdateReq::default();
        update.populate(&mut req);
        assert_eq!(req.returnvalue, Some(true));

        let get = CounterGetOptions::default().r(Quorum::One);
        let mut req = RpbCounterGetReq::default();
        get.populate(&mut req);
        assert_eq!(req.r, Some(u32::MAX - 1));
    }

    #[test]
    fn test_timeout_millis_saturates() {
        assert_eq!(millis(Duration::from_millis(1500)), 1500);
        assert_eq!(millis(Duration::from_secs(u64::MAX / 1000)), u32::MAX);
    }
}
