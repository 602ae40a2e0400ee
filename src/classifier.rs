//! Syntactic-production classifier.
//!
//! A parser that reaches an ambiguous stretch of text parses it once while
//! recording, per candidate production, the first error that would rule the
//! production out. The classifier is the shared append-only log behind
//! that: scopes buffer their errors, a scope that ends clean truncates them
//! away, and a scope that recorded anything collapses into a single skip
//! entry so the first-error-per-production property survives arbitrary
//! nesting at O(1) amortized cost per scope.

use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

use thiserror::Error;

/// Bit set of candidate productions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Productions(u32);

impl Productions {
    pub const NONE: Productions = Productions(0);
    pub const EXPRESSION: Productions = Productions(1 << 0);
    pub const BINDING_PATTERN: Productions = Productions(1 << 1);
    pub const ASSIGNMENT_PATTERN: Productions = Productions(1 << 2);
    pub const DISTINCT_FORMAL_PARAMETERS: Productions = Productions(1 << 3);
    pub const STRICT_MODE_FORMAL_PARAMETERS: Productions = Productions(1 << 4);
    pub const STRONG_MODE_FORMAL_PARAMETERS: Productions = Productions(1 << 5);
    pub const ARROW_FORMAL_PARAMETERS: Productions = Productions(1 << 6);

    pub const PATTERNS: Productions =
        Productions(Self::BINDING_PATTERN.0 | Self::ASSIGNMENT_PATTERN.0);
    pub const FORMAL_PARAMETERS: Productions = Productions(
        Self::DISTINCT_FORMAL_PARAMETERS.0
            | Self::STRICT_MODE_FORMAL_PARAMETERS.0
            | Self::STRONG_MODE_FORMAL_PARAMETERS.0,
    );
    pub const STANDARD: Productions =
        Productions(Self::EXPRESSION.0 | Self::PATTERNS.0);
    pub const ALL: Productions = Productions(
        Self::STANDARD.0 | Self::FORMAL_PARAMETERS.0 | Self::ARROW_FORMAL_PARAMETERS.0,
    );

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// All of `other`'s bits are set.
    pub fn contains(self, other: Productions) -> bool {
        self.0 & other.0 == other.0
    }

    /// At least one of `other`'s bits is set.
    pub fn intersects(self, other: Productions) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for Productions {
    type Output = Productions;
    fn bitor(self, rhs: Productions) -> Productions {
        Productions(self.0 | rhs.0)
    }
}

impl BitOrAssign for Productions {
    fn bitor_assign(&mut self, rhs: Productions) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Productions {
    type Output = Productions;
    fn bitand(self, rhs: Productions) -> Productions {
        Productions(self.0 & rhs.0)
    }
}

impl Not for Productions {
    type Output = Productions;
    fn not(self) -> Productions {
        Productions(!self.0 & Productions::ALL.0)
    }
}

/// Half-open code-unit range an error points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub begin: usize,
    pub end: usize,
}

impl Location {
    pub fn new(begin: usize, end: usize) -> Self {
        Location { begin, end }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseMessage {
    #[error("unexpected token")]
    UnexpectedToken,
    #[error("invalid destructuring assignment target")]
    InvalidDestructuringTarget,
    #[error("invalid left-hand side in assignment")]
    InvalidLhsInAssignment,
    #[error("duplicate parameter name not allowed in this context")]
    StrictParamDupe,
    #[error("unexpected eval or arguments in strict mode")]
    StrictEvalArguments,
    #[error("unexpected strict mode reserved word")]
    UnexpectedStrictReserved,
    #[error("invalid shorthand property initializer")]
    InvalidCoverInitializedName,
    #[error("rest parameter must be last formal parameter")]
    ElementAfterRest,
}

/// One recorded error: where, what, and an optional offending name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub location: Location,
    pub message: ParseMessage,
    pub arg: Option<Box<str>>,
}

#[derive(Debug, Clone)]
enum BufferEntry {
    /// A recorded error invalidating `invalid`.
    Leaf { invalid: Productions, error: ParseError },
    /// A collapsed scope: when searching for a production not in `invalid`,
    /// jump back over `skip` entries.
    Skip { invalid: Productions, skip: usize },
}

impl BufferEntry {
    fn invalid(&self) -> Productions {
        match self {
            BufferEntry::Leaf { invalid, .. } | BufferEntry::Skip { invalid, .. } => *invalid,
        }
    }

    fn skip(&self) -> usize {
        match self {
            BufferEntry::Leaf { .. } => 0,
            BufferEntry::Skip { skip, .. } => *skip,
        }
    }
}

/// A scope's view of the classifier: the log length at entry plus the
/// productions invalidated inside the scope. Plain value; the classifier
/// owns the log, and a scope ends by handing itself to [`Classifier::pop`].
#[derive(Debug)]
pub struct ClassifierScope {
    start: usize,
    invalid: Productions,
}

impl ClassifierScope {
    pub fn invalid_productions(&self) -> Productions {
        self.invalid
    }

    pub fn is_valid(&self, production: Productions) -> bool {
        !self.invalid.intersects(production)
    }

    pub fn is_valid_expression(&self) -> bool {
        self.is_valid(Productions::EXPRESSION)
    }

    pub fn is_valid_binding_pattern(&self) -> bool {
        self.is_valid(Productions::BINDING_PATTERN)
    }

    pub fn is_valid_assignment_pattern(&self) -> bool {
        self.is_valid(Productions::ASSIGNMENT_PATTERN)
    }

    pub fn is_valid_arrow_formal_parameters(&self) -> bool {
        self.is_valid(Productions::ARROW_FORMAL_PARAMETERS)
    }

    pub fn is_valid_formal_parameter_list_without_duplicates(&self) -> bool {
        self.is_valid(Productions::DISTINCT_FORMAL_PARAMETERS)
    }

    /// Callers should also check
    /// [`is_valid_formal_parameter_list_without_duplicates`][Self::is_valid_formal_parameter_list_without_duplicates].
    pub fn is_valid_strict_mode_formal_parameters(&self) -> bool {
        self.is_valid(Productions::STRICT_MODE_FORMAL_PARAMETERS)
    }

    pub fn is_valid_strong_mode_formal_parameters(&self) -> bool {
        self.is_valid(Productions::STRONG_MODE_FORMAL_PARAMETERS)
    }

    /// Propagate `inner`'s invalidations, restricted to `productions`,
    /// without overwriting anything already recorded here. Exception: the
    /// outer remains a valid arrow formal parameter list only while the
    /// inner is a valid *binding pattern*, because arrow formals propagate
    /// from binding-pattern invalidation, not from their own.
    pub fn accumulate(&mut self, inner: &ClassifierScope, productions: Productions) {
        if inner.invalid.is_empty() {
            return;
        }
        let non_arrow_inner = inner.invalid & !Productions::ARROW_FORMAL_PARAMETERS;
        let non_arrow_mask = productions & !Productions::ARROW_FORMAL_PARAMETERS;
        self.invalid |= non_arrow_mask & non_arrow_inner;

        if productions.intersects(Productions::ARROW_FORMAL_PARAMETERS)
            && !inner.is_valid_binding_pattern()
        {
            self.invalid |= Productions::ARROW_FORMAL_PARAMETERS;
        }
    }
}

/// The shared error log. One per speculative parse pass.
#[derive(Debug, Default)]
pub struct Classifier {
    buffer: Vec<BufferEntry>,
}

impl Classifier {
    pub fn new() -> Self {
        Classifier { buffer: Vec::with_capacity(128) }
    }

    /// Open a scope at the current log position.
    pub fn push(&self) -> ClassifierScope {
        ClassifierScope { start: self.buffer.len(), invalid: Productions::NONE }
    }

    /// Close a scope. A clean scope truncates its extent away; a scope that
    /// invalidated anything leaves its entries in place and appends one
    /// skip entry summarizing them.
    pub fn pop(&mut self, scope: ClassifierScope) {
        debug_assert!(self.buffer.len() >= scope.start);
        if self.buffer.len() == scope.start {
            debug_assert!(scope.invalid.is_empty());
            return;
        }
        if scope.invalid.is_empty() {
            self.buffer.truncate(scope.start);
        } else {
            let skip = self.buffer.len() - scope.start;
            self.buffer.push(BufferEntry::Skip { invalid: scope.invalid, skip });
        }
    }

    /// Record an error against `production` in `scope`. Only the first
    /// error per production within a scope is kept; later ones are no-ops.
    pub fn record_error(
        &mut self,
        scope: &mut ClassifierScope,
        production: Productions,
        location: Location,
        message: ParseMessage,
        arg: Option<&str>,
    ) {
        if !scope.is_valid(production) {
            return;
        }
        scope.invalid |= production;
        self.buffer.push(BufferEntry::Leaf {
            invalid: production,
            error: ParseError { location, message, arg: arg.map(Into::into) },
        });
    }

    pub fn record_expression_error(
        &mut self,
        scope: &mut ClassifierScope,
        location: Location,
        message: ParseMessage,
    ) {
        self.record_error(scope, Productions::EXPRESSION, location, message, None);
    }

    pub fn record_binding_pattern_error(
        &mut self,
        scope: &mut ClassifierScope,
        location: Location,
        message: ParseMessage,
    ) {
        self.record_error(scope, Productions::BINDING_PATTERN, location, message, None);
    }

    pub fn record_assignment_pattern_error(
        &mut self,
        scope: &mut ClassifierScope,
        location: Location,
        message: ParseMessage,
    ) {
        self.record_error(scope, Productions::ASSIGNMENT_PATTERN, location, message, None);
    }

    pub fn record_arrow_formal_parameters_error(
        &mut self,
        scope: &mut ClassifierScope,
        location: Location,
        message: ParseMessage,
    ) {
        self.record_error(scope, Productions::ARROW_FORMAL_PARAMETERS, location, message, None);
    }

    pub fn record_duplicate_formal_parameter_error(
        &mut self,
        scope: &mut ClassifierScope,
        location: Location,
    ) {
        self.record_error(
            scope,
            Productions::DISTINCT_FORMAL_PARAMETERS,
            location,
            ParseMessage::StrictParamDupe,
            None,
        );
    }

    /// A binding that would be invalid in strict mode. Not the same thing
    /// as a duplicate formal parameter, which has its own production.
    pub fn record_strict_mode_formal_parameter_error(
        &mut self,
        scope: &mut ClassifierScope,
        location: Location,
        message: ParseMessage,
        arg: Option<&str>,
    ) {
        self.record_error(
            scope,
            Productions::STRICT_MODE_FORMAL_PARAMETERS,
            location,
            message,
            arg,
        );
    }

    pub fn record_strong_mode_formal_parameter_error(
        &mut self,
        scope: &mut ClassifierScope,
        location: Location,
        message: ParseMessage,
        arg: Option<&str>,
    ) {
        self.record_error(
            scope,
            Productions::STRONG_MODE_FORMAL_PARAMETERS,
            location,
            message,
            arg,
        );
    }

    /// First error recorded for `production`, in depth-first order.
    ///
    /// Walks backward from the log end, jumping over collapsed scopes whose
    /// invalid set lacks the production. Only valid once the scope has the
    /// production invalid; the invalid bit is what guarantees a matching
    /// leaf exists, so the walk terminates.
    pub fn find_error(&self, scope: &ClassifierScope, production: Productions) -> &ParseError {
        assert!(!scope.is_valid(production), "no error recorded for {production:?}");
        // Arrow formals propagate from binding-pattern invalidation rather
        // than their own, so their search accepts binding-pattern entries:
        // collapsed scopes that broke a binding pattern are entered, and
        // the binding-pattern leaf is the arrow error.
        let accept = if production == Productions::ARROW_FORMAL_PARAMETERS {
            production | Productions::BINDING_PATTERN
        } else {
            production
        };
        let mut end = self.buffer.len();
        loop {
            debug_assert!(end > 0);
            let idx = end - 1;
            let entry = &self.buffer[idx];
            if !entry.invalid().intersects(accept) {
                debug_assert!(entry.skip() <= idx);
                end = idx - entry.skip();
            } else if let BufferEntry::Leaf { error, .. } = entry {
                return error;
            } else {
                end = idx;
            }
        }
    }

    pub fn expression_error(&self, scope: &ClassifierScope) -> &ParseError {
        self.find_error(scope, Productions::EXPRESSION)
    }

    pub fn binding_pattern_error(&self, scope: &ClassifierScope) -> &ParseError {
        self.find_error(scope, Productions::BINDING_PATTERN)
    }

    pub fn assignment_pattern_error(&self, scope: &ClassifierScope) -> &ParseError {
        self.find_error(scope, Productions::ASSIGNMENT_PATTERN)
    }

    pub fn arrow_formal_parameters_error(&self, scope: &ClassifierScope) -> &ParseError {
        self.find_error(scope, Productions::ARROW_FORMAL_PARAMETERS)
    }

    pub fn duplicate_formal_parameter_error(&self, scope: &ClassifierScope) -> &ParseError {
        self.find_error(scope, Productions::DISTINCT_FORMAL_PARAMETERS)
    }

    pub fn strict_mode_formal_parameter_error(&self, scope: &ClassifierScope) -> &ParseError {
        self.find_error(scope, Productions::STRICT_MODE_FORMAL_PARAMETERS)
    }

    pub fn strong_mode_formal_parameter_error(&self, scope: &ClassifierScope) -> &ParseError {
        self.find_error(scope, Productions::STRONG_MODE_FORMAL_PARAMETERS)
    }

    /// Log length, exposed for pop/truncation assertions in tests.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
