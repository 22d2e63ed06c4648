use crate::artifacts::diff::myers::{Edit, Line};

/// Equal lines kept on each side of a change
pub const HUNK_CONTEXT: usize = 3;

/// A run of edits padded with up to [`HUNK_CONTEXT`] unchanged lines
///
/// Changes separated by fewer than `2 * HUNK_CONTEXT + 1` equal lines share a
/// hunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    a_start: usize,
    b_start: usize,
    edits: Vec<Edit<Line>>,
}

impl Hunk {
    pub fn filter(edits: &[Edit<Line>]) -> Vec<Hunk> {
        let mut hunks = Vec::new();
        let mut offset = 0usize;

        loop {
            while edits.get(offset).is_some_and(Edit::is_equal) {
                offset += 1;
            }
            if offset >= edits.len() {
                return hunks;
            }

            let start = offset as isize - (HUNK_CONTEXT as isize + 1);
            let (a_start, b_start) = match usize::try_from(start) {
                Ok(start) if start > 0 => (
                    edits[start].a_value().map_or(0, |line| line.number),
                    edits[start].b_value().map_or(0, |line| line.number),
                ),
                _ => (0, 0),
            };

            let mut hunk = Hunk {
                a_start,
                b_start,
                edits: Vec::new(),
            };
            offset = hunk.build(edits, start);
            hunks.push(hunk);
        }
    }

    /// Collect edits from `offset` until the trailing context runs out;
    /// returns where scanning should resume
    fn build(&mut self, edits: &[Edit<Line>], mut offset: isize) -> usize {
        let mut counter: isize = -1;

        while counter != 0 {
            if offset >= 0 && counter > 0 {
                self.edits.push(edits[offset as usize].clone());
            }

            offset += 1;
            if offset >= edits.len() as isize {
                break;
            }

            let far_context = usize::try_from(offset + HUNK_CONTEXT as isize)
                .ok()
                .and_then(|index| edits.get(index));
            match far_context {
                Some(edit) if !edit.is_equal() => counter = 2 * HUNK_CONTEXT as isize + 1,
                _ => counter -= 1,
            }
        }

        offset.max(0) as usize
    }

    pub fn edits(&self) -> &[Edit<Line>] {
        &self.edits
    }

    /// `@@ -a_start,a_count +b_start,b_count @@`
    pub fn header(&self) -> String {
        let (a_start, a_count) = Self::range(self.edits.iter().filter_map(Edit::a_value), self.a_start);
        let (b_start, b_count) = Self::range(self.edits.iter().filter_map(Edit::b_value), self.b_start);

        format!("@@ -{a_start},{a_count} +{b_start},{b_count} @@")
    }

    fn range<'l>(mut lines: impl Iterator<Item = &'l Line>, default_start: usize) -> (usize, usize) {
        match lines.next() {
            Some(first) => (first.number, 1 + lines.count()),
            None => (default_start, 0),
        }
    }
}
