/// One physical line of input with its 1-based line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RawLine<'a> {
    pub text: &'a str,
    pub number: u32,
}

/// Iterator over the physical lines of a document.
///
/// A clone resumes from the same position; call [`lines`] again to start over.
#[derive(Debug, Clone)]
pub(crate) struct Lines<'a> {
    rest: Option<&'a str>,
    number: u32,
}

pub(crate) fn lines(input: &str) -> Lines<'_> {
    Lines {
        rest: (!input.is_empty()).then_some(input),
        number: 0,
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = RawLine<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest?;
        let (line, tail) = match rest.split_once('\n') {
            Some((line, tail)) => (line, (!tail.is_empty()).then_some(tail)),
            None => (rest, None),
        };
        self.rest = tail;
        self.number += 1;

        Some(RawLine {
            text: line.strip_suffix('\r').unwrap_or(line),
            number: self.number,
        })
    }
}
