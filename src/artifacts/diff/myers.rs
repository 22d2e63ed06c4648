//! Myers' O(ND) shortest edit script
//!
//! [`MyersDiff::shortest_edit`] advances depth by depth, keeping a snapshot of
//! the furthest-reaching frontier at the start of every depth. The snapshots
//! are then walked backwards from the end state to recover the moves, which
//! are replayed forwards as [`Edit`]s. Keeping every snapshot costs O(D²)
//! memory.

use derive_new::new;
use std::fmt::Display;

/// Frontier snapshots, one per depth, indexed by diagonal `k + offset`
pub type Trace = Vec<Vec<isize>>;

/// `(prev_x, prev_y, x, y)`: one step of the edit path
pub type Move = (isize, isize, isize, isize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit<T> {
    Equal { a: T, b: T },
    Insert { b: T },
    Delete { a: T },
}

impl<T> Edit<T> {
    pub fn a_value(&self) -> Option<&T> {
        match self {
            Edit::Equal { a, .. } | Edit::Delete { a } => Some(a),
            Edit::Insert { .. } => None,
        }
    }

    pub fn b_value(&self) -> Option<&T> {
        match self {
            Edit::Equal { b, .. } | Edit::Insert { b } => Some(b),
            Edit::Delete { .. } => None,
        }
    }

    pub fn is_equal(&self) -> bool {
        matches!(self, Edit::Equal { .. })
    }

    pub fn symbol(&self) -> char {
        match self {
            Edit::Equal { .. } => ' ',
            Edit::Insert { .. } => '+',
            Edit::Delete { .. } => '-',
        }
    }
}

impl<T: Display> Display for Edit<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Edit::Equal { a: value, .. } | Edit::Insert { b: value } | Edit::Delete { a: value } => {
                write!(f, "{}{}", self.symbol(), value)
            }
        }
    }
}

/// A numbered line of a document
///
/// Lines compare by text only; the number locates them for hunk headers.
#[derive(Debug, Clone, Eq, new)]
pub struct Line {
    pub number: usize,
    pub text: String,
}

impl PartialEq for Line {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Split raw content into 1-based numbered lines, decoding lossily
pub fn lines(document: &[u8]) -> Vec<Line> {
    String::from_utf8_lossy(document)
        .lines()
        .enumerate()
        .map(|(index, text)| Line::new(index + 1, text.to_string()))
        .collect()
}

/// Line edits between two documents
pub fn diff_lines(a: &[u8], b: &[u8]) -> Vec<Edit<Line>> {
    let (a, b) = (lines(a), lines(b));
    MyersDiff::new(&a, &b).diff()
}

#[derive(Debug, Clone, new)]
pub struct MyersDiff<'d, T> {
    a: &'d [T],
    b: &'d [T],
}

impl<T: PartialEq + Clone> MyersDiff<'_, T> {
    /// Diagonals range over `[-(n + m) - 1, n + m + 1]`
    fn offset(&self) -> isize {
        (self.a.len() + self.b.len()) as isize + 1
    }

    pub fn shortest_edit(&self) -> Trace {
        let (n, m) = (self.a.len() as isize, self.b.len() as isize);
        let offset = self.offset();
        let index = |k: isize| (offset + k) as usize;

        let mut v = vec![0isize; (2 * offset + 1) as usize];
        let mut trace = Vec::new();

        for depth in 0..=(n + m) {
            trace.push(v.clone());

            for k in (-depth..=depth).step_by(2) {
                // the boundary diagonals can only be reached from one side
                let mut x = if k == -depth || (k != depth && v[index(k - 1)] < v[index(k + 1)]) {
                    v[index(k + 1)]
                } else {
                    v[index(k - 1)] + 1
                };

                let mut y = x - k;
                while x < n && y < m && self.a[x as usize] == self.b[y as usize] {
                    x += 1;
                    y += 1;
                }

                v[index(k)] = x;

                if x >= n && y >= m {
                    return trace;
                }
            }
        }

        trace
    }

    /// Moves from the end state back to the origin
    pub fn backtrack(&self) -> Vec<Move> {
        let (mut x, mut y) = (self.a.len() as isize, self.b.len() as isize);
        let offset = self.offset();
        let index = |k: isize| (offset + k) as usize;
        let mut moves = Vec::new();

        for (depth, v) in self.shortest_edit().iter().enumerate().rev() {
            let depth = depth as isize;
            let k = x - y;

            let prev_k = if k == -depth || (k != depth && v[index(k - 1)] < v[index(k + 1)]) {
                k + 1
            } else {
                k - 1
            };
            let prev_x = v[index(prev_k)];
            let prev_y = prev_x - prev_k;

            while x > prev_x && y > prev_y {
                moves.push((x - 1, y - 1, x, y));
                x -= 1;
                y -= 1;
            }

            if depth > 0 {
                moves.push((prev_x, prev_y, x, y));
            }

            (x, y) = (prev_x, prev_y);
        }

        moves
    }

    pub fn diff(&self) -> Vec<Edit<T>> {
        let mut edits = self
            .backtrack()
            .into_iter()
            .map(|(prev_x, prev_y, x, y)| {
                if x == prev_x {
                    Edit::Insert {
                        b: self.b[prev_y as usize].clone(),
                    }
                } else if y == prev_y {
                    Edit::Delete {
                        a: self.a[prev_x as usize].clone(),
                    }
                } else {
                    Edit::Equal {
                        a: self.a[prev_x as usize].clone(),
                        b: self.b[prev_y as usize].clone(),
                    }
                }
            })
            .collect::<Vec<_>>();

        edits.reverse();
        edits
    }
}
