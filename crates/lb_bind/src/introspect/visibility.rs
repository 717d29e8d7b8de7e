use crate::class::Visibility;

use super::AccessorKind;

// -----------------------------------------------------------------------------
// VisibilityThreshold

/// The least visible member an accessor kind picks up implicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisibilityThreshold {
    /// Every member, including private ones.
    Any,
    NonPrivate,
    ProtectedAndPublic,
    #[default]
    PublicOnly,
    /// No member is visible without an explicit marker.
    None,
}

impl VisibilityThreshold {
    /// Whether a member declared with `visibility` passes this threshold.
    ///
    /// ```
    /// use lb_bind::class::Visibility;
    /// use lb_bind::introspect::VisibilityThreshold;
    ///
    /// assert!(VisibilityThreshold::NonPrivate.allows(Visibility::Package));
    /// assert!(!VisibilityThreshold::PublicOnly.allows(Visibility::Protected));
    /// assert!(!VisibilityThreshold::None.allows(Visibility::Public));
    /// ```
    pub const fn allows(self, visibility: Visibility) -> bool {
        match self {
            Self::Any => true,
            Self::NonPrivate => !matches!(visibility, Visibility::Private),
            Self::ProtectedAndPublic => {
                matches!(visibility, Visibility::Protected | Visibility::Public)
            }
            Self::PublicOnly => matches!(visibility, Visibility::Public),
            Self::None => false,
        }
    }
}

// -----------------------------------------------------------------------------
// VisibilityConfig

/// Implicit visibility thresholds, one per accessor kind.
///
/// All kinds default to [`VisibilityThreshold::PublicOnly`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VisibilityConfig {
    pub field: VisibilityThreshold,
    pub getter: VisibilityThreshold,
    pub is_getter: VisibilityThreshold,
    pub setter: VisibilityThreshold,
}

impl VisibilityConfig {
    /// The same threshold for every accessor kind.
    #[inline]
    pub const fn all(threshold: VisibilityThreshold) -> Self {
        Self {
            field: threshold,
            getter: threshold,
            is_getter: threshold,
            setter: threshold,
        }
    }

    #[inline]
    pub const fn with_fields(mut self, threshold: VisibilityThreshold) -> Self {
        self.field = threshold;
        self
    }

    #[inline]
    pub const fn with_getters(mut self, threshold: VisibilityThreshold) -> Self {
        self.getter = threshold;
        self
    }

    #[inline]
    pub const fn with_is_getters(mut self, threshold: VisibilityThreshold) -> Self {
        self.is_getter = threshold;
        self
    }

    #[inline]
    pub const fn with_setters(mut self, threshold: VisibilityThreshold) -> Self {
        self.setter = threshold;
        self
    }

    #[inline]
    pub const fn threshold(&self, kind: AccessorKind) -> VisibilityThreshold {
        match kind {
            AccessorKind::Field => self.field,
            AccessorKind::Getter => self.getter,
            AccessorKind::IsGetter => self.is_getter,
            AccessorKind::Setter => self.setter,
        }
    }
}
