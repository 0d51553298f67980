/// Number of symbols in the nucleotide alphabet, including the no-call `N`.
pub const SYMBOL_NUMBER: usize = 5;
/// Number of called nucleotides (A, C, G, T).
pub const SYMBOL_NUMBER_NO_N: usize = 4;

/// Nucleotide symbol used by the consensus graph and the feature schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum Symbol {
    /// Adenine.
    A = 0,
    /// Cytosine.
    C = 1,
    /// Guanine.
    G = 2,
    /// Thymine/Uracil.
    T = 3,
    /// No-call or any unrecognised character.
    N = 4,
}

impl Symbol {
    /// Called bases in index order.
    pub const BASES: [Symbol; SYMBOL_NUMBER_NO_N] = [Symbol::A, Symbol::C, Symbol::G, Symbol::T];

    /// Every symbol in index order, `N` last.
    pub const ALL: [Symbol; SYMBOL_NUMBER] = [Symbol::A, Symbol::C, Symbol::G, Symbol::T, Symbol::N];

    /// Convert an ASCII character; anything outside ACGTU maps to `N`.
    pub fn from_ascii(base: u8) -> Self {
        match base {
            b'A' | b'a' => Symbol::A,
            b'C' | b'c' => Symbol::C,
            b'G' | b'g' => Symbol::G,
            b'T' | b't' | b'U' | b'u' => Symbol::T,
            _ => Symbol::N,
        }
    }

    /// Uppercase ASCII character for the symbol.
    pub fn to_ascii(self) -> u8 {
        match self {
            Symbol::A => b'A',
            Symbol::C => b'C',
            Symbol::G => b'G',
            Symbol::T => b'T',
            Symbol::N => b'N',
        }
    }

    /// Index into per-symbol tables.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether this is a called base (not `N`).
    pub fn is_called(self) -> bool {
        self != Symbol::N
    }
}

/// Orientation of the read that contributed a piece of evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum Strand {
    /// Read aligned in the forward orientation.
    Forward,
    /// Read aligned as a reverse complement.
    Reverse,
}

impl Strand {
    /// Both strands in storage order.
    pub const BOTH: [Strand; 2] = [Strand::Forward, Strand::Reverse];

    /// Strand for a read's forward flag.
    pub fn from_forward(forward: bool) -> Self {
        if forward {
            Strand::Forward
        } else {
            Strand::Reverse
        }
    }

    /// Storage index: forward is 0, reverse is 1.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Strand::Forward => 0,
            Strand::Reverse => 1,
        }
    }

    /// Column suffix used by the tabular exporter.
    pub fn suffix(self) -> &'static str {
        match self {
            Strand::Forward => "fwd",
            Strand::Reverse => "rev",
        }
    }
}
