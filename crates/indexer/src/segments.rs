use regex::Regex;
use std::borrow::Cow;

/// A configured boundary pattern that failed to compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternWarning {
    pub index: usize,
    pub pattern: String,
    pub message: String,
}

/// Ordered set of compiled segment-boundary patterns.
#[derive(Debug, Clone, Default)]
pub struct SegmentPatterns {
    patterns: Vec<Regex>,
}

impl SegmentPatterns {
    /// Compile pattern sources in order. Invalid sources are logged and skipped;
    /// an empty result is valid and yields a single implicit segment per file.
    ///
    /// A source that fails to parse is retried once with its literal braces
    /// escaped, so RE2-style patterns such as `func .*\(.*\).*{` still load.
    pub fn compile<S: AsRef<str>>(sources: &[S]) -> (Self, Vec<PatternWarning>) {
        let mut patterns = Vec::with_capacity(sources.len());
        let mut warnings = Vec::new();

        for (index, source) in sources.iter().enumerate() {
            let source = source.as_ref();
            match compile_lenient(source) {
                Ok(re) => patterns.push(re),
                Err(err) => {
                    log::warn!("Skipping invalid segment pattern #{index} '{source}': {err}");
                    warnings.push(PatternWarning {
                        index,
                        pattern: source.to_string(),
                        message: err.to_string(),
                    });
                }
            }
        }

        (Self { patterns }, warnings)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// True when any pattern matches somewhere in `line`.
    pub fn is_boundary(&self, line: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(line))
    }
}

fn compile_lenient(source: &str) -> Result<Regex, regex::Error> {
    let err = match Regex::new(source) {
        Ok(re) => return Ok(re),
        Err(err) => err,
    };
    match escape_literal_braces(source) {
        Cow::Owned(rewritten) => match Regex::new(&rewritten) {
            Ok(re) => {
                log::debug!("Segment pattern '{source}' compiled as '{rewritten}'");
                Ok(re)
            }
            Err(_) => Err(err),
        },
        Cow::Borrowed(_) => Err(err),
    }
}

/// Escape every `{` that does not open a counted repetition (`{n}`, `{n,}`,
/// `{n,m}`) or belong to an escape such as `\p{L}` or `\x{41}`, together
/// with its matching `}`.
fn escape_literal_braces(source: &str) -> Cow<'_, str> {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len() + 4);
    let mut escaped_open = 0usize;
    let mut changed = false;
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' => {
                out.push('\\');
                let Some(&next) = chars.get(i + 1) else {
                    i += 1;
                    continue;
                };
                out.push(next);
                i += 2;
                if matches!(next, 'p' | 'P' | 'x' | 'u' | 'U') && chars.get(i) == Some(&'{') {
                    while i < chars.len() {
                        out.push(chars[i]);
                        i += 1;
                        if chars[i - 1] == '}' {
                            break;
                        }
                    }
                }
            }
            '{' => match repetition_len(&chars[i..]) {
                Some(len) => {
                    out.extend(&chars[i..i + len]);
                    i += len;
                }
                None => {
                    out.push_str("\\{");
                    escaped_open += 1;
                    changed = true;
                    i += 1;
                }
            },
            '}' if escaped_open > 0 => {
                out.push_str("\\}");
                escaped_open -= 1;
                i += 1;
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }

    if changed {
        Cow::Owned(out)
    } else {
        Cow::Borrowed(source)
    }
}

/// Length of a `{n}`, `{n,}` or `{n,m}` token at the start of `chars`.
fn repetition_len(chars: &[char]) -> Option<usize> {
    let mut i = 1;
    let digits = |from: usize| chars[from..].iter().take_while(|c| c.is_ascii_digit()).count();

    let min = digits(i);
    if min == 0 {
        return None;
    }
    i += min;
    if chars.get(i) == Some(&',') {
        i += 1;
        i += digits(i);
    }
    (chars.get(i) == Some(&'}')).then_some(i + 1)
}

/// Split normalized text the same way segment indices are counted: on `\n`,
/// keeping `\r` and the trailing empty line after a final newline.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}

/// Indices of lines that open a segment, ascending and unique.
pub fn detect_segments<S: AsRef<str>>(lines: &[S], patterns: &SegmentPatterns) -> Vec<usize> {
    if patterns.is_empty() {
        return Vec::new();
    }
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| patterns.is_boundary(line.as_ref()))
        .map(|(idx, _)| idx)
        .collect()
}

/// Human-facing label of a segment: its opening line without line terminators.
pub fn segment_label(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}
