/// Largest element count accepted from any stream count field.
pub const DEFAULT_MAX_ELEMENTS: usize = 1 << 24;

/// Knobs for a single decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    pub max_elements: usize,
    pub validate_indices: bool,
    pub strict_supplement: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_elements: DEFAULT_MAX_ELEMENTS,
            validate_indices: true,
            strict_supplement: false,
        }
    }
}

impl DecodeOptions {
    pub fn with_max_elements(mut self, max_elements: usize) -> Self {
        self.max_elements = max_elements;
        self
    }

    pub fn with_index_validation(mut self, validate_indices: bool) -> Self {
        self.validate_indices = validate_indices;
        self
    }

    pub fn with_strict_supplement(mut self, strict_supplement: bool) -> Self {
        self.strict_supplement = strict_supplement;
        self
    }
}
