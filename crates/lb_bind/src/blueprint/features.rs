use bitflags::bitflags;

bitflags! {
    /// Switches of a [`Blueprint`](super::Blueprint).
    ///
    /// The default is `USE_FIELDS | USE_IS_GETTERS`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Features: u16 {
        /// Fields become properties without explicit metadata.
        const USE_FIELDS = 1 << 0;
        /// `isName` getters of `bool` properties become properties without
        /// explicit metadata.
        const USE_IS_GETTERS = 1 << 1;
        /// Class-scoped members are considered too.
        const INCLUDE_STATIC_MEMBERS = 1 << 2;
        /// Reading an unknown property fails instead of skipping its value.
        const FAIL_ON_UNKNOWN_PROPERTY = 1 << 3;
        /// Properties whose value is null are written instead of left out.
        const WRITE_NULL_PROPERTIES = 1 << 4;
        /// Enumeration values are written as their ordinal.
        const WRITE_ENUMS_USING_INDEX = 1 << 5;
        /// Property names are matched ignoring case when reading.
        const CASE_INSENSITIVE_PROPERTIES = 1 << 6;
    }
}

impl Default for Features {
    #[inline]
    fn default() -> Self {
        Self::USE_FIELDS | Self::USE_IS_GETTERS
    }
}
