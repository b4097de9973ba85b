// Copyright 2025 The dotml Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The named character-reference table.
//!
//! Names that may historically appear without a trailing semicolon are
//! present in both spellings. The table is sorted once at startup; matching
//! works by narrowing a binary-search range one character at a time, which
//! gives the longest-match behaviour the tokenizer needs without a separate
//! trie structure.

use std::sync::LazyLock;

/// `(name, code point)`. Order here does not matter; the table is sorted at
/// startup.
#[rustfmt::skip]
static RAW: &[(&str, u32)] = &[
    // Legacy set: valid with and without the trailing semicolon.
    ("AElig", 0xC6), ("AElig;", 0xC6),
    ("AMP", 0x26), ("AMP;", 0x26),
    ("Aacute", 0xC1), ("Aacute;", 0xC1),
    ("Acirc", 0xC2), ("Acirc;", 0xC2),
    ("Agrave", 0xC0), ("Agrave;", 0xC0),
    ("Aring", 0xC5), ("Aring;", 0xC5),
    ("Atilde", 0xC3), ("Atilde;", 0xC3),
    ("Auml", 0xC4), ("Auml;", 0xC4),
    ("COPY", 0xA9), ("COPY;", 0xA9),
    ("Ccedil", 0xC7), ("Ccedil;", 0xC7),
    ("ETH", 0xD0), ("ETH;", 0xD0),
    ("Eacute", 0xC9), ("Eacute;", 0xC9),
    ("Ecirc", 0xCA), ("Ecirc;", 0xCA),
    ("Egrave", 0xC8), ("Egrave;", 0xC8),
    ("Euml", 0xCB), ("Euml;", 0xCB),
    ("GT", 0x3E), ("GT;", 0x3E),
    ("Iacute", 0xCD), ("Iacute;", 0xCD),
    ("Icirc", 0xCE), ("Icirc;", 0xCE),
    ("Igrave", 0xCC), ("Igrave;", 0xCC),
    ("Iuml", 0xCF), ("Iuml;", 0xCF),
    ("LT", 0x3C), ("LT;", 0x3C),
    ("Ntilde", 0xD1), ("Ntilde;", 0xD1),
    ("Oacute", 0xD3), ("Oacute;", 0xD3),
    ("Ocirc", 0xD4), ("Ocirc;", 0xD4),
    ("Ograve", 0xD2), ("Ograve;", 0xD2),
    ("Oslash", 0xD8), ("Oslash;", 0xD8),
    ("Otilde", 0xD5), ("Otilde;", 0xD5),
    ("Ouml", 0xD6), ("Ouml;", 0xD6),
    ("QUOT", 0x22), ("QUOT;", 0x22),
    ("REG", 0xAE), ("REG;", 0xAE),
    ("THORN", 0xDE), ("THORN;", 0xDE),
    ("Uacute", 0xDA), ("Uacute;", 0xDA),
    ("Ucirc", 0xDB), ("Ucirc;", 0xDB),
    ("Ugrave", 0xD9), ("Ugrave;", 0xD9),
    ("Uuml", 0xDC), ("Uuml;", 0xDC),
    ("Yacute", 0xDD), ("Yacute;", 0xDD),
    ("aacute", 0xE1), ("aacute;", 0xE1),
    ("acirc", 0xE2), ("acirc;", 0xE2),
    ("acute", 0xB4), ("acute;", 0xB4),
    ("aelig", 0xE6), ("aelig;", 0xE6),
    ("agrave", 0xE0), ("agrave;", 0xE0),
    ("amp", 0x26), ("amp;", 0x26),
    ("aring", 0xE5), ("aring;", 0xE5),
    ("atilde", 0xE3), ("atilde;", 0xE3),
    ("auml", 0xE4), ("auml;", 0xE4),
    ("brvbar", 0xA6), ("brvbar;", 0xA6),
    ("ccedil", 0xE7), ("ccedil;", 0xE7),
    ("cedil", 0xB8), ("cedil;", 0xB8),
    ("cent", 0xA2), ("cent;", 0xA2),
    ("copy", 0xA9), ("copy;", 0xA9),
    ("curren", 0xA4), ("curren;", 0xA4),
    ("deg", 0xB0), ("deg;", 0xB0),
    ("divide", 0xF7), ("divide;", 0xF7),
    ("eacute", 0xE9), ("eacute;", 0xE9),
    ("ecirc", 0xEA), ("ecirc;", 0xEA),
    ("egrave", 0xE8), ("egrave;", 0xE8),
    ("eth", 0xF0), ("eth;", 0xF0),
    ("euml", 0xEB), ("euml;", 0xEB),
    ("frac12", 0xBD), ("frac12;", 0xBD),
    ("frac14", 0xBC), ("frac14;", 0xBC),
    ("frac34", 0xBE), ("frac34;", 0xBE),
    ("gt", 0x3E), ("gt;", 0x3E),
    ("iacute", 0xED), ("iacute;", 0xED),
    ("icirc", 0xEE), ("icirc;", 0xEE),
    ("iexcl", 0xA1), ("iexcl;", 0xA1),
    ("igrave", 0xEC), ("igrave;", 0xEC),
    ("iquest", 0xBF), ("iquest;", 0xBF),
    ("iuml", 0xEF), ("iuml;", 0xEF),
    ("laquo", 0xAB), ("laquo;", 0xAB),
    ("lt", 0x3C), ("lt;", 0x3C),
    ("macr", 0xAF), ("macr;", 0xAF),
    ("micro", 0xB5), ("micro;", 0xB5),
    ("middot", 0xB7), ("middot;", 0xB7),
    ("nbsp", 0xA0), ("nbsp;", 0xA0),
    ("not", 0xAC), ("not;", 0xAC),
    ("ntilde", 0xF1), ("ntilde;", 0xF1),
    ("oacute", 0xF3), ("oacute;", 0xF3),
    ("ocirc", 0xF4), ("ocirc;", 0xF4),
    ("ograve", 0xF2), ("ograve;", 0xF2),
    ("ordf", 0xAA), ("ordf;", 0xAA),
    ("ordm", 0xBA), ("ordm;", 0xBA),
    ("oslash", 0xF8), ("oslash;", 0xF8),
    ("otilde", 0xF5), ("otilde;", 0xF5),
    ("ouml", 0xF6), ("ouml;", 0xF6),
    ("para", 0xB6), ("para;", 0xB6),
    ("plusmn", 0xB1), ("plusmn;", 0xB1),
    ("pound", 0xA3), ("pound;", 0xA3),
    ("quot", 0x22), ("quot;", 0x22),
    ("raquo", 0xBB), ("raquo;", 0xBB),
    ("reg", 0xAE), ("reg;", 0xAE),
    ("sect", 0xA7), ("sect;", 0xA7),
    ("shy", 0xAD), ("shy;", 0xAD),
    ("sup1", 0xB9), ("sup1;", 0xB9),
    ("sup2", 0xB2), ("sup2;", 0xB2),
    ("sup3", 0xB3), ("sup3;", 0xB3),
    ("szlig", 0xDF), ("szlig;", 0xDF),
    ("thorn", 0xFE), ("thorn;", 0xFE),
    ("times", 0xD7), ("times;", 0xD7),
    ("uacute", 0xFA), ("uacute;", 0xFA),
    ("ucirc", 0xFB), ("ucirc;", 0xFB),
    ("ugrave", 0xF9), ("ugrave;", 0xF9),
    ("uml", 0xA8), ("uml;", 0xA8),
    ("uuml", 0xFC), ("uuml;", 0xFC),
    ("yacute", 0xFD), ("yacute;", 0xFD),
    ("yen", 0xA5), ("yen;", 0xA5),
    ("yuml", 0xFF), ("yuml;", 0xFF),

    // Semicolon-required names.
    ("apos;", 0x27),
    ("OElig;", 0x152), ("oelig;", 0x153),
    ("Scaron;", 0x160), ("scaron;", 0x161),
    ("Yuml;", 0x178),
    ("fnof;", 0x192),
    ("circ;", 0x2C6), ("tilde;", 0x2DC),
    ("Alpha;", 0x391), ("Beta;", 0x392), ("Gamma;", 0x393), ("Delta;", 0x394),
    ("Epsilon;", 0x395), ("Zeta;", 0x396), ("Eta;", 0x397), ("Theta;", 0x398),
    ("Iota;", 0x399), ("Kappa;", 0x39A), ("Lambda;", 0x39B), ("Mu;", 0x39C),
    ("Nu;", 0x39D), ("Xi;", 0x39E), ("Omicron;", 0x39F), ("Pi;", 0x3A0),
    ("Rho;", 0x3A1), ("Sigma;", 0x3A3), ("Tau;", 0x3A4), ("Upsilon;", 0x3A5),
    ("Phi;", 0x3A6), ("Chi;", 0x3A7), ("Psi;", 0x3A8), ("Omega;", 0x3A9),
    ("alpha;", 0x3B1), ("beta;", 0x3B2), ("gamma;", 0x3B3), ("delta;", 0x3B4),
    ("epsilon;", 0x3B5), ("zeta;", 0x3B6), ("eta;", 0x3B7), ("theta;", 0x3B8),
    ("iota;", 0x3B9), ("kappa;", 0x3BA), ("lambda;", 0x3BB), ("mu;", 0x3BC),
    ("nu;", 0x3BD), ("xi;", 0x3BE), ("omicron;", 0x3BF), ("pi;", 0x3C0),
    ("rho;", 0x3C1), ("sigmaf;", 0x3C2), ("sigma;", 0x3C3), ("tau;", 0x3C4),
    ("upsilon;", 0x3C5), ("phi;", 0x3C6), ("chi;", 0x3C7), ("psi;", 0x3C8),
    ("omega;", 0x3C9), ("thetasym;", 0x3D1), ("upsih;", 0x3D2), ("piv;", 0x3D6),
    ("ensp;", 0x2002), ("emsp;", 0x2003), ("thinsp;", 0x2009),
    ("zwnj;", 0x200C), ("zwj;", 0x200D), ("lrm;", 0x200E), ("rlm;", 0x200F),
    ("ndash;", 0x2013), ("mdash;", 0x2014),
    ("lsquo;", 0x2018), ("rsquo;", 0x2019), ("sbquo;", 0x201A),
    ("ldquo;", 0x201C), ("rdquo;", 0x201D), ("bdquo;", 0x201E),
    ("dagger;", 0x2020), ("Dagger;", 0x2021), ("bull;", 0x2022),
    ("hellip;", 0x2026), ("permil;", 0x2030),
    ("prime;", 0x2032), ("Prime;", 0x2033),
    ("lsaquo;", 0x2039), ("rsaquo;", 0x203A),
    ("oline;", 0x203E), ("frasl;", 0x2044), ("euro;", 0x20AC),
    ("image;", 0x2111), ("weierp;", 0x2118), ("real;", 0x211C),
    ("trade;", 0x2122), ("alefsym;", 0x2135),
    ("larr;", 0x2190), ("uarr;", 0x2191), ("rarr;", 0x2192),
    ("darr;", 0x2193), ("harr;", 0x2194), ("crarr;", 0x21B5),
    ("lArr;", 0x21D0), ("uArr;", 0x21D1), ("rArr;", 0x21D2),
    ("dArr;", 0x21D3), ("hArr;", 0x21D4),
    ("forall;", 0x2200), ("part;", 0x2202), ("exist;", 0x2203),
    ("empty;", 0x2205), ("nabla;", 0x2207), ("isin;", 0x2208),
    ("notin;", 0x2209), ("ni;", 0x220B), ("prod;", 0x220F),
    ("sum;", 0x2211), ("minus;", 0x2212), ("lowast;", 0x2217),
    ("radic;", 0x221A), ("prop;", 0x221D), ("infin;", 0x221E),
    ("ang;", 0x2220), ("and;", 0x2227), ("or;", 0x2228),
    ("cap;", 0x2229), ("cup;", 0x222A), ("int;", 0x222B),
    ("there4;", 0x2234), ("sim;", 0x223C), ("cong;", 0x2245),
    ("asymp;", 0x2248), ("ne;", 0x2260), ("equiv;", 0x2261),
    ("le;", 0x2264), ("ge;", 0x2265),
    ("sub;", 0x2282), ("sup;", 0x2283), ("nsub;", 0x2284),
    ("sube;", 0x2286), ("supe;", 0x2287),
    ("oplus;", 0x2295), ("otimes;", 0x2297), ("perp;", 0x22A5),
    ("sdot;", 0x22C5),
    ("lceil;", 0x2308), ("rceil;", 0x2309),
    ("lfloor;", 0x230A), ("rfloor;", 0x230B),
    ("lang;", 0x27E8), ("rang;", 0x27E9),
    ("loz;", 0x25CA), ("spades;", 0x2660), ("clubs;", 0x2663),
    ("hearts;", 0x2665), ("diams;", 0x2666),
];

static TABLE: LazyLock<Vec<(&'static str, u32)>> = LazyLock::new(|| {
    let mut table = RAW.to_vec();
    table.sort_unstable_by(|a, b| a.0.cmp(b.0));
    debug_assert!(table.windows(2).all(|w| w[0].0 < w[1].0));
    table
});

/// Look up a (partial) reference name, without the leading `&`.
///
/// Returns `Some((c1, c2))` on a full match, `Some((0, 0))` when the name is
/// a strict prefix of at least one longer reference, and `None` when no
/// reference starts this way. A full match can simultaneously be a prefix of
/// a longer name (`not` vs `notin;`); the caller keeps consuming until the
/// match can no longer be extended.
pub fn lookup(name: &str) -> Option<(u32, u32)> {
    let table = &*TABLE;
    let start = table.partition_point(|e| e.0 < name);
    match table.get(start) {
        Some(&(n, cp)) if n == name => Some((cp, 0)),
        Some(&(n, _)) if n.starts_with(name) => Some((0, 0)),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::lookup;

    #[test]
    fn full_and_prefix_matches() {
        assert_eq!(lookup("amp;"), Some((0x26, 0)));
        assert_eq!(lookup("amp"), Some((0x26, 0)));
        assert_eq!(lookup("am"), Some((0, 0)));
        assert_eq!(lookup("amq"), None);
    }

    #[test]
    fn longest_match_continuation() {
        // `not` is terminal but also a prefix of `notin;`.
        assert_eq!(lookup("not"), Some((0xAC, 0)));
        assert_eq!(lookup("noti"), Some((0, 0)));
        assert_eq!(lookup("notin;"), Some((0x2209, 0)));
    }

    #[test]
    fn semicolon_only_names_have_no_bare_form() {
        assert_eq!(lookup("apos;"), Some((0x27, 0)));
        // Bare `apos` is a prefix, never a terminal.
        assert_eq!(lookup("apos"), Some((0, 0)));
    }
}
