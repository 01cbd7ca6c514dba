/// Limits and layout shared by every conversion entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionOptions {
    /// Deepest nesting accepted or produced before a conversion gives up
    /// with a depth error.
    pub max_depth: usize,
    /// Spaces per nesting level in written MathML; 0 writes one line.
    pub indent: usize,
    pub xml_declaration: bool,
}

impl ConversionOptions {
    /// Parsing and reading at this depth fit a 2 MiB thread stack, even in
    /// debug builds.
    pub const DEFAULT_MAX_DEPTH: usize = 64;

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_xml_declaration(mut self, xml_declaration: bool) -> Self {
        self.xml_declaration = xml_declaration;
        self
    }
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            indent: 2,
            xml_declaration: false,
        }
    }
}
