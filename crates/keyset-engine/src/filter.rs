//! Caller-supplied filter predicates.

use std::fmt;
use std::marker::PhantomData;

use keyset_core::{FieldFilter, SearchFilter};
use serde::{Deserialize, Serialize};

use crate::query::Predicate;

/// Identity of the caller a page is fetched for.
///
/// The engine never interprets it; it is forwarded unchanged to the
/// [`FilterBuilder`] so queries can be scoped to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    name: String,
}

impl Principal {
    /// Creates a principal with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the principal name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Translates a caller's search filter into a store predicate.
///
/// Invoked once per page fetch while building the keyset query. Returning
/// `None` means the result set is not restricted.
pub trait FilterBuilder: Send + Sync {
    /// Filter type accepted by the builder.
    type Filter: SearchFilter + ?Sized;

    /// Builds the filter predicate.
    fn build_filter(
        &self,
        filter: Option<&Self::Filter>,
        principal: Option<&Principal>,
    ) -> Option<Predicate>;
}

impl FilterBuilder for () {
    type Filter = ();

    fn build_filter(&self, _: Option<&()>, _: Option<&Principal>) -> Option<Predicate> {
        None
    }
}

/// Builds one equality predicate per [`FieldFilter`] entry, conjoined.
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualityFilter;

impl FilterBuilder for EqualityFilter {
    type Filter = FieldFilter;

    fn build_filter(
        &self,
        filter: Option<&FieldFilter>,
        _: Option<&Principal>,
    ) -> Option<Predicate> {
        let filter = filter.filter(|filter| !filter.is_empty())?;
        Some(Predicate::and(
            filter
                .iter()
                .map(|(field, value)| Predicate::eq(field, value.clone())),
        ))
    }
}

/// A [`FilterBuilder`] backed by a closure. See [`filter_fn`].
pub struct FilterFn<F: ?Sized, C> {
    build: C,
    filter: PhantomData<fn(&F)>,
}

/// Creates a [`FilterBuilder`] from a closure.
///
/// ```rust
/// use keyset_core::FieldFilter;
/// use keyset_engine::query::Predicate;
/// use keyset_engine::{FilterBuilder, Principal, filter_fn};
///
/// let builder = filter_fn(|_: Option<&FieldFilter>, principal: Option<&Principal>| {
///     principal.map(|p| Predicate::eq("owner", p.name()))
/// });
///
/// let alice = Principal::new("alice");
/// assert_eq!(
///     builder.build_filter(None, Some(&alice)),
///     Some(Predicate::eq("owner", "alice"))
/// );
/// ```
pub fn filter_fn<F, C>(build: C) -> FilterFn<F, C>
where
    F: SearchFilter + ?Sized,
    C: Fn(Option<&F>, Option<&Principal>) -> Option<Predicate> + Send + Sync,
{
    FilterFn {
        build,
        filter: PhantomData,
    }
}

impl<F, C> FilterBuilder for FilterFn<F, C>
where
    F: SearchFilter + ?Sized,
    C: Fn(Option<&F>, Option<&Principal>) -> Option<Predicate> + Send + Sync,
{
    type Filter = F;

    fn build_filter(&self, filter: Option<&F>, principal: Option<&Principal>) -> Option<Predicate> {
        (self.build)(filter, principal)
    }
}

impl<F: ?Sized, C> fmt::Debug for FilterFn<F, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterFn").finish_non_exhaustive()
    }
}
