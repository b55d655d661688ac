//! Canonical Text Format
//!
//! This module documents the line-oriented text the [`Encoder`](crate::Encoder)
//! writes and the [`Scanner`](crate::Scanner) reads.
//!
//! # Overview
//!
//! One event per row. Rows are indented by nesting depth for human readers;
//! the indentation carries no meaning and is ignored when reading.
//!
//! ```text
//! NS p=urn:ui
//! NS x=http://schemas.microsoft.com/winfx/2006/xaml
//! SO p:Grid	@1,2
//!   SM Grid.Row
//!     V "1"
//!   EM
//!   SM x:_Items IMPLICIT
//!     GO
//!     EO
//!   EM
//! EO
//! Closed.
//! ```
//!
//! # Rows
//!
//! | Opcode | Operands | Event |
//! |--------|----------|-------|
//! | `NS` | `<prefix>=<uri>` | Namespace declaration, bound to the next object |
//! | `SO` | `[<prefix>:]<Type>` `[RETRIEVED]` | Start of a constructed object |
//! | `GO` | none | Start of a retrieved object |
//! | `EO` | none | End of the innermost object |
//! | `SM` | `[<prefix>:]<Name>` `[IMPLICIT]` `[UNKNOWN]` | Start of a member |
//! | `EM` | none | End of the innermost member |
//! | `V` | `"<escaped>"` or bare text | Leaf value |
//! | `Closed.` | none | End of stream; nothing may follow |
//!
//! ## Names
//!
//! - The first `:` separates the prefix; a token without one has the empty prefix.
//! - `NS` splits on the first `=`; `NS =urn:ui` binds the default prefix.
//! - Attachable members are written `Owner.Name`.
//! - An unprefixed member reads in the namespace bound to the empty prefix,
//!   or in its object's type namespace when the empty prefix is unbound.
//! - `NS` rows appear at the root or inside an open member, never directly
//!   inside an object.
//!
//! ## Prefix resolution
//!
//! Bindings are searched from the innermost object outward. At the root,
//! `xml` resolves to the XML namespace and `x` to the XAML namespace. Any
//! other unbound prefix is an error; an unbound empty prefix means "no
//! namespace".
//!
//! ## Values
//!
//! The encoder always quotes values. The scanner also accepts a bare value and
//! takes the rest of the row verbatim.
//!
//! **Escape sequences** (in quoted values):
//! ```text
//! \"  - quote
//! \\  - backslash
//! \n  - newline
//! \r  - carriage return
//! \t  - tab
//! \b  - backspace
//! \f  - form feed
//! \0  - null character
//! \uXXXX - Unicode codepoint (4 hex digits)
//! ```
//!
//! ## Diagnostic suffix
//!
//! A literal tab ends the row body. Whatever follows, normally `@line,col`, is
//! kept as [`LineInfo`](crate::LineInfo) and never compared. Values cannot
//! contain a raw tab because the encoder escapes it.
//!
//! # Canonical form
//!
//! After [`Canonicalizer`](crate::Canonicalizer) runs, a row has no
//! indentation, no diagnostic suffix, and a quoted value, so the quoted and
//! bare spellings of the same value compare equal.
//!
//! # Errors
//!
//! | Input | Error |
//! |-------|-------|
//! | `ZZ foo` | [`Error::UnknownOpcode`](crate::Error::UnknownOpcode) |
//! | `SM p:Width` with `p` unbound | [`Error::UnboundPrefix`](crate::Error::UnboundPrefix) |
//! | `V "abc` | [`Error::Syntax`](crate::Error::Syntax) |
//! | `EO` with no open object | [`Error::Unbalanced`](crate::Error::Unbalanced) |
//! | any row after `Closed.` | [`Error::Syntax`](crate::Error::Syntax) |
