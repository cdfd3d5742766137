//! Text normalisation ahead of classification: lowercase, drop stop-words,
//! Porter-stem what's left, rejoin with single spaces.

/// The classic English stop-word list, kept sorted for `binary_search`.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an",
    "and", "any", "are", "as", "at", "be", "because", "been", "before",
    "being", "below", "between", "both", "but", "by", "can", "did", "do",
    "does", "doing", "don", "down", "during", "each", "few", "for", "from",
    "further", "had", "has", "have", "having", "he", "her", "here", "hers",
    "herself", "him", "himself", "his", "how", "i", "if", "in", "into", "is",
    "it", "its", "itself", "just", "me", "more", "most", "my", "myself",
    "no", "nor", "not", "now", "of", "off", "on", "once", "only", "or",
    "other", "our", "ours", "ourselves", "out", "over", "own", "s", "same",
    "she", "should", "so", "some", "such", "t", "than", "that", "the",
    "their", "theirs", "them", "themselves", "then", "there", "these",
    "they", "this", "those", "through", "to", "too", "under", "until", "up",
    "very", "was", "we", "were", "what", "when", "where", "which", "while",
    "who", "whom", "why", "will", "with", "you", "your", "yours",
    "yourself", "yourselves",
];

fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.binary_search(&word).is_ok()
}

pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .filter(|word| !is_stop_word(word))
        .map(|word| stem(&word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Porter's 1980 suffix-stripping algorithm. Expects lowercase input;
/// words of one or two letters are left alone.
pub fn stem(word: &str) -> String {
    if word.len() <= 2 {
        return word.into();
    }

    let mut w = word.as_bytes().to_vec();

    step1a(&mut w);
    step1b(&mut w);
    step1c(&mut w);
    step2(&mut w);
    step3(&mut w);
    step4(&mut w);
    step5(&mut w);

    match String::from_utf8(w) {
        Ok(stemmed) => stemmed,
        // non-ascii word truncated mid-codepoint; leave it unstemmed
        Err(_) => word.into(),
    }
}

/// `y` counts as a vowel when it follows a consonant.
fn is_cons(w: &[u8], i: usize) -> bool {
    match w[i] {
        b'a' | b'e' | b'i' | b'o' | b'u' => false,
        b'y' => i == 0 || !is_cons(w, i - 1),
        _ => true,
    }
}

/// The measure m of a word: the number of VC runs in [C](VC)^m[V].
fn measure(w: &[u8]) -> usize {
    let n = w.len();
    let mut m = 0;
    let mut i = 0;

    while i < n && is_cons(w, i) {
        i += 1;
    }
    loop {
        while i < n && !is_cons(w, i) {
            i += 1;
        }
        if i == n {
            return m;
        }
        while i < n && is_cons(w, i) {
            i += 1;
        }
        m += 1;
        if i == n {
            return m;
        }
    }
}

fn has_vowel(w: &[u8]) -> bool {
    (0..w.len()).any(|i| !is_cons(w, i))
}

fn ends_double_cons(w: &[u8]) -> bool {
    let n = w.len();
    n >= 2 && w[n - 1] == w[n - 2] && is_cons(w, n - 1)
}

/// *o: stem ends consonant-vowel-consonant, final consonant not w, x or y.
fn ends_cvc(w: &[u8]) -> bool {
    let n = w.len();
    n >= 3
        && is_cons(w, n - 3)
        && !is_cons(w, n - 2)
        && is_cons(w, n - 1)
        && !matches!(w[n - 1], b'w' | b'x' | b'y')
}

fn ends(w: &[u8], suffix: &[u8]) -> bool {
    w.len() > suffix.len() && w.ends_with(suffix)
}

fn step1a(w: &mut Vec<u8>) {
    if ends(w, b"sses") || ends(w, b"ies") {
        w.truncate(w.len() - 2);
    } else if ends(w, b"ss") {
        // unchanged
    } else if ends(w, b"s") {
        w.truncate(w.len() - 1);
    }
}

fn step1b(w: &mut Vec<u8>) {
    if ends(w, b"eed") {
        if measure(&w[..w.len() - 3]) > 0 {
            w.truncate(w.len() - 1);
        }
        return;
    }

    let removed = if ends(w, b"ed") && has_vowel(&w[..w.len() - 2]) {
        w.truncate(w.len() - 2);
        true
    } else if ends(w, b"ing") && has_vowel(&w[..w.len() - 3]) {
        w.truncate(w.len() - 3);
        true
    } else {
        false
    };

    if removed {
        if ends(w, b"at") || ends(w, b"bl") || ends(w, b"iz") {
            w.push(b'e');
        } else if ends_double_cons(w) && !matches!(w.last(), Some(b'l' | b's' | b'z')) {
            w.truncate(w.len() - 1);
        } else if measure(w) == 1 && ends_cvc(w) {
            w.push(b'e');
        }
    }
}

fn step1c(w: &mut Vec<u8>) {
    if ends(w, b"y") && has_vowel(&w[..w.len() - 1]) {
        let n = w.len();
        w[n - 1] = b'i';
    }
}

/// Apply the first matching suffix rule; the rewrite only happens when the
/// remaining stem's measure exceeds `min_m`.
fn apply_rules(w: &mut Vec<u8>, rules: &[(&[u8], &[u8])], min_m: usize) {
    for &(suffix, replacement) in rules {
        if ends(w, suffix) {
            let stem_len = w.len() - suffix.len();
            if measure(&w[..stem_len]) > min_m {
                w.truncate(stem_len);
                w.extend_from_slice(replacement);
            }
            return;
        }
    }
}

fn step2(w: &mut Vec<u8>) {
    // longer suffixes listed before their own suffixes (ization before ation)
    const RULES: &[(&[u8], &[u8])] = &[
        (b"ational", b"ate"),
        (b"tional", b"tion"),
        (b"enci", b"ence"),
        (b"anci", b"ance"),
        (b"izer", b"ize"),
        (b"abli", b"able"),
        (b"alli", b"al"),
        (b"entli", b"ent"),
        (b"ousli", b"ous"),
        (b"eli", b"e"),
        (b"ization", b"ize"),
        (b"ation", b"ate"),
        (b"ator", b"ate"),
        (b"alism", b"al"),
        (b"iveness", b"ive"),
        (b"fulness", b"ful"),
        (b"ousness", b"ous"),
        (b"aliti", b"al"),
        (b"iviti", b"ive"),
        (b"biliti", b"ble"),
    ];

    apply_rules(w, RULES, 0);
}

fn step3(w: &mut Vec<u8>) {
    const RULES: &[(&[u8], &[u8])] = &[
        (b"icate", b"ic"),
        (b"ative", b""),
        (b"alize", b"al"),
        (b"iciti", b"ic"),
        (b"ical", b"ic"),
        (b"ful", b""),
        (b"ness", b""),
    ];

    apply_rules(w, RULES, 0);
}

fn step4(w: &mut Vec<u8>) {
    const SUFFIXES: &[&[u8]] = &[
        b"ement", b"ance", b"ence", b"able", b"ible", b"ment", b"ant",
        b"ent", b"ion", b"ism", b"ate", b"iti", b"ous", b"ive", b"ize",
        b"al", b"er", b"ic", b"ou",
    ];

    for &suffix in SUFFIXES {
        if ends(w, suffix) {
            let stem_len = w.len() - suffix.len();
            let stem = &w[..stem_len];

            // `ion` only drops after s or t
            let applies = measure(stem) > 1
                && (suffix != b"ion" || matches!(stem.last(), Some(b's' | b't')));

            if applies {
                w.truncate(stem_len);
            }
            return;
        }
    }
}

fn step5(w: &mut Vec<u8>) {
    // 5a: trim a final e
    if w.last() == Some(&b'e') {
        let stem = &w[..w.len() - 1];
        let m = measure(stem);
        if m > 1 || (m == 1 && !ends_cvc(stem)) {
            w.truncate(w.len() - 1);
        }
    }

    // 5b: -ll -> -l for longer words
    if measure(w) > 1 && ends_double_cons(w) && w.last() == Some(&b'l') {
        w.truncate(w.len() - 1);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn stop_word_list_is_sorted() {
        let mut sorted = STOP_WORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(STOP_WORDS, &sorted[..]);
    }

    #[test]
    fn plurals() {
        assert_eq!(stem("caresses"), "caress");
        assert_eq!(stem("ponies"), "poni");
        assert_eq!(stem("caress"), "caress");
        assert_eq!(stem("cats"), "cat");
    }

    #[test]
    fn past_and_continuous() {
        assert_eq!(stem("feed"), "feed");
        assert_eq!(stem("agreed"), "agre");
        assert_eq!(stem("plastered"), "plaster");
        assert_eq!(stem("motoring"), "motor");
        assert_eq!(stem("denied"), "deni");
        assert_eq!(stem("running"), "run");
        assert_eq!(stem("hopping"), "hop");
        assert_eq!(stem("falling"), "fall");
        assert_eq!(stem("filing"), "file");
        assert_eq!(stem("controlling"), "control");
    }

    #[test]
    fn y_to_i() {
        assert_eq!(stem("happy"), "happi");
        assert_eq!(stem("sky"), "sky");
    }

    #[test]
    fn derivational_suffixes() {
        assert_eq!(stem("relational"), "relat");
        assert_eq!(stem("electrical"), "electr");
        assert_eq!(stem("hopeful"), "hope");
        assert_eq!(stem("goodness"), "good");
        assert_eq!(stem("adoption"), "adopt");
        assert_eq!(stem("formalize"), "formal");
    }

    #[test]
    fn short_words_untouched() {
        assert_eq!(stem("is"), "is");
        assert_eq!(stem("be"), "be");
        assert_eq!(stem("free"), "free");
    }

    #[test]
    fn normalize_lowercases_and_filters() {
        assert_eq!(
            normalize("The WINNER is calling you NOW"),
            "winner call"
        );
    }

    #[test]
    fn normalize_keeps_word_order() {
        assert_eq!(
            normalize("Claim your FREE cash prize"),
            "claim free cash prize"
        );
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize("  hello   world  "), "hello world");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn normalize_of_only_stop_words_is_empty() {
        assert_eq!(normalize("it is what it is"), "");
    }
}
