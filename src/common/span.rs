use chumsky::span::SimpleSpan;

/// Byte range into the source text
pub type Span = SimpleSpan;

/// A value paired with the source range it was read from
pub type Spanned<T> = (T, Span);
