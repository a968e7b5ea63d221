use core::fmt;

const TAG_BITS: u32 = 3;
const TAG_MASK: u64 = 0b111;

/// Runtime type tag, stored in the low 3 bits of a [`Term`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    /// Raw heap address. Reserved for internal use; user code never holds one.
    Pointer = 0,
    /// 61-bit small integer.
    Int = 1,
    /// Address of a word array `[arity, e1, .., en]`.
    Tuple = 2,
    /// Address of an RRB root record.
    List = 3,
    /// Address of a NUL-terminated UTF-8 buffer.
    String = 4,
    /// Address of a function record.
    Function = 5,
}

/// The low bits named a tag value that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownTag(pub u8);

impl fmt::Display for UnknownTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown term tag {:#05b}", self.0)
    }
}

impl TryFrom<u8> for Tag {
    type Error = UnknownTag;

    fn try_from(bits: u8) -> Result<Self, UnknownTag> {
        match bits {
            0 => Ok(Tag::Pointer),
            1 => Ok(Tag::Int),
            2 => Ok(Tag::Tuple),
            3 => Ok(Tag::List),
            4 => Ok(Tag::String),
            5 => Ok(Tag::Function),
            b => Err(UnknownTag(b)),
        }
    }
}

impl Tag {
    /// Human-readable type name, as reported by `type_of` and type errors.
    pub const fn name(self) -> &'static str {
        match self {
            Tag::Pointer => "Pointer",
            Tag::Int => "Int",
            Tag::Tuple => "Tuple",
            Tag::List => "List",
            Tag::String => "String",
            Tag::Function => "Function",
        }
    }
}

/// A tagged 64-bit term word.
///
/// `Term` is an opaque copyable handle; the interpreter moves terms between
/// registers by plain assignment. The three singletons `false`, `true` and
/// `nil` are encoded as small even constants whose payloads decode to address
/// zero; the allocator never returns these words, so identity comparison is
/// enough to recognize them. Code dispatching on a heap tag must check
/// [`Term::is_sentinel`] first.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Term(u64);

impl Term {
    /// The zeroed register state. Never produced by any instruction.
    pub const EMPTY: Term = Term(0);
    /// The `false` singleton.
    pub const FALSE: Term = Term(2);
    /// The `true` singleton.
    pub const TRUE: Term = Term(4);
    /// The `nil` singleton.
    pub const NIL: Term = Term(6);

    /// Build a term from its raw word.
    pub const fn from_raw(raw: u64) -> Self {
        Term(raw)
    }

    /// The raw word.
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Whether this term is one of `false`, `true`, `nil`.
    pub const fn is_sentinel(self) -> bool {
        self.0 == Self::FALSE.0 || self.0 == Self::TRUE.0 || self.0 == Self::NIL.0
    }

    /// The tag in the low 3 bits.
    ///
    /// Sentinels report whatever their constant bits decode to; callers are
    /// expected to have ruled them out already.
    pub fn tag(self) -> Tag {
        Tag::try_from((self.0 & TAG_MASK) as u8).unwrap_or(Tag::Pointer)
    }

    /// Pack a small integer. Lossless for values below `2^61`.
    pub const fn int(value: u64) -> Self {
        Term((value << TAG_BITS) | Tag::Int as u64)
    }

    /// Unpack a small integer payload.
    pub const fn as_int(self) -> u64 {
        self.0 >> TAG_BITS
    }

    /// Tag a heap address. The address must be 8-byte aligned.
    pub fn tag_ptr(ptr: *const u8, tag: Tag) -> Self {
        debug_assert!(ptr as u64 & TAG_MASK == 0, "unaligned heap address");
        Term(ptr as u64 | tag as u64)
    }

    /// The payload interpreted as a heap address.
    pub const fn payload_ptr(self) -> *mut u8 {
        (self.0 & !TAG_MASK) as *mut u8
    }

    /// Encode a boolean as the matching singleton.
    pub const fn bool(value: bool) -> Self {
        if value {
            Self::TRUE
        } else {
            Self::FALSE
        }
    }

    /// Everything is truthy except `false` and `nil`.
    pub const fn truthy(self) -> bool {
        !(self.0 == Self::FALSE.0 || self.0 == Self::NIL.0)
    }

    /// Logical negation: truthy terms become `false`, the rest `true`.
    pub const fn negate(self) -> Self {
        Self::bool(!self.truthy())
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::EMPTY => write!(f, "Term::EMPTY"),
            Self::FALSE => write!(f, "Term::FALSE"),
            Self::TRUE => write!(f, "Term::TRUE"),
            Self::NIL => write!(f, "Term::NIL"),
            t => write!(f, "Term({:?}, {:#x})", t.tag(), t.0 >> TAG_BITS),
        }
    }
}
