//! Text layout for a generated batch.

/// Column budget used when soft-wrapping a batch.
pub const LINE_WIDTH: usize = 80;

/// How passwords are laid out in the output sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Layout {
    /// Space separated, wrapped once a line would run past [`LINE_WIDTH`],
    /// followed by a final newline.
    #[default]
    Wrapped,
    /// One password per line.
    OnePerLine,
}

/// Renders `passwords` as text.
///
/// The wrapped layout fills lines by byte count: each password advances the
/// column by its length plus one separator, and a newline is emitted instead
/// of the separator once the column reaches `LINE_WIDTH - length`. The batch
/// always ends with an extra newline, so a line that wrapped on its last
/// password leaves an empty line behind it.
pub fn format_batch<S: AsRef<str>>(passwords: &[S], layout: Layout) -> String {
    let total: usize = passwords.iter().map(|p| p.as_ref().len() + 1).sum();
    let mut out = String::with_capacity(total + 1);

    match layout {
        Layout::Wrapped => {
            let mut column = 0usize;
            for password in passwords {
                let password = password.as_ref();
                out.push_str(password);

                column += password.len() + 1;
                if column < LINE_WIDTH.saturating_sub(password.len()) {
                    out.push(' ');
                } else {
                    out.push('\n');
                    column = 0;
                }
            }
            out.push('\n');
        }
        Layout::OnePerLine => {
            for password in passwords {
                out.push_str(password.as_ref());
                out.push('\n');
            }
        }
    }

    out
}
