//! Interactive page-by-page list browser.
//!
//! The pager renders one page of a list at a time and reads navigation
//! commands from a [`LineSource`]:
//!
//! | Input   | Effect                                   |
//! |---------|------------------------------------------|
//! | (empty) | redraw the current page                  |
//! | `n`     | next page                                |
//! | `p`/`b` | previous page                            |
//! | `g`     | ask for a page number and jump there     |
//! | `q`     | quit without a selection                 |
//! | number  | select that item (selection mode only)   |
//!
//! End of input at any prompt is treated like `q`.

use crate::error::PaginatorError;
use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Prompts currently blocked on input, across all pagers.
static PENDING_PROMPTS: AtomicUsize = AtomicUsize::new(0);

/// True while some pager is waiting for the user to type a line.
///
/// The CLI's Ctrl-C handler uses this to treat an interrupt at a prompt as
/// a quit.
pub fn awaiting_input() -> bool {
    PENDING_PROMPTS.load(Ordering::SeqCst) > 0
}

/// Source of user input lines.
pub trait LineSource {
    /// Reads the next line without its terminator. `None` means the input
    /// is exhausted.
    fn next_line(&mut self) -> io::Result<Option<String>>;
}

impl<R: BufRead> LineSource for R {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Where the pager is in its interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Showing `page` and waiting for a navigation command.
    Browsing { page: usize },
    /// Waiting for a destination page number; `page` is restored on cancel.
    AwaitingGoto { page: usize },
    /// Finished, with the zero-based index of the selected item if any.
    Terminated(Option<usize>),
}

/// Page geometry for one list.
#[derive(Debug, Clone, Copy)]
struct Layout {
    total: usize,
    page_size: usize,
    pages: usize,
    selection: bool,
}

impl Layout {
    /// Zero-based `[start, end)` item range of `page`.
    fn bounds(&self, page: usize) -> (usize, usize) {
        let start = (page - 1) * self.page_size;
        (start, (start + self.page_size).min(self.total))
    }
}

/// Result of applying one input line to a state.
#[derive(Debug, PartialEq, Eq)]
struct Transition {
    next: State,
    message: Option<String>,
}

impl Transition {
    fn to(next: State) -> Self {
        Self {
            next,
            message: None,
        }
    }

    fn stay(page: usize, message: String) -> Self {
        Self {
            next: State::Browsing { page },
            message: Some(message),
        }
    }
}

/// Applies a navigation command typed while browsing `page`.
fn browse(layout: &Layout, page: usize, cmd: &str) -> Transition {
    match cmd {
        "" => Transition::to(State::Browsing { page }),
        "q" => Transition::to(State::Terminated(None)),
        "n" if page < layout.pages => Transition::to(State::Browsing { page: page + 1 }),
        "n" => Transition::stay(page, "Already at last page.".to_string()),
        "p" | "b" if page > 1 => Transition::to(State::Browsing { page: page - 1 }),
        "p" | "b" => Transition::stay(page, "Already at first page.".to_string()),
        "g" => Transition::to(State::AwaitingGoto { page }),
        _ if !layout.selection => {
            Transition::stay(page, "Invalid input. Use n/p/g/b/q.".to_string())
        }
        _ => select(layout, page, cmd),
    }
}

/// Interprets `cmd` as a global, 1-based item number on the current page.
fn select(layout: &Layout, page: usize, cmd: &str) -> Transition {
    let Ok(pick) = cmd.parse::<usize>() else {
        return Transition::stay(
            page,
            "Invalid input. Enter an item number or n/p/g/b/q.".to_string(),
        );
    };

    let (start, end) = layout.bounds(page);
    let (low, high) = (start + 1, end);
    if !(low..=high).contains(&pick) {
        return Transition::stay(page, format!("Out of range. Enter {low}..{high}."));
    }

    Transition::to(State::Terminated(Some(pick - 1)))
}

/// Applies the answer to the goto prompt.
fn goto(layout: &Layout, page: usize, raw: &str) -> Transition {
    match raw {
        "" => Transition::to(State::Browsing { page }),
        "q" => Transition::to(State::Terminated(None)),
        _ => match raw.parse::<usize>() {
            Err(_) => Transition::stay(
                page,
                format!(
                    "Invalid input: '{}'. Enter a number 1..{} (q to quit).",
                    raw, layout.pages
                ),
            ),
            Ok(target) if (1..=layout.pages).contains(&target) => {
                Transition::to(State::Browsing { page: target })
            }
            Ok(_) => Transition::stay(
                page,
                format!("Out of range. Enter a number 1..{} (q to quit).", layout.pages),
            ),
        },
    }
}

/// Interactive pager over an input source and an output sink.
pub struct Paginator<I, W> {
    input: I,
    output: W,
}

impl Paginator<io::StdinLock<'static>, io::Stdout> {
    /// Pager reading from stdin and writing to stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<I: LineSource, W: Write> Paginator<I, W> {
    /// Creates a pager over the given input and output.
    pub fn new(input: I, output: W) -> Self {
        Self { input, output }
    }

    /// Consumes the pager and returns its output sink.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Shows `items` page by page.
    ///
    /// With `selection` enabled the user may pick an item on the current
    /// page, which is returned. Quitting (or running out of input) returns
    /// `None`, as does an empty list after printing "No results.".
    pub fn paginate<'a, T: Display>(
        &mut self,
        items: &'a [T],
        page_size: usize,
        header: Option<&str>,
        selection: bool,
    ) -> Result<Option<&'a T>, PaginatorError> {
        if page_size == 0 {
            return Err(PaginatorError::InvalidPageSize);
        }

        if items.is_empty() {
            writeln!(self.output, "No results.")?;
            return Ok(None);
        }

        let layout = Layout {
            total: items.len(),
            page_size,
            pages: items.len().div_ceil(page_size),
            selection,
        };

        let mut state = State::Browsing { page: 1 };
        loop {
            let transition = match state {
                State::Terminated(choice) => return Ok(choice.map(|index| &items[index])),
                State::Browsing { page } => {
                    self.render(items, &layout, page, header)?;
                    let prompt = nav_prompt(&layout, page);
                    match self.prompt(&prompt)? {
                        Some(cmd) => browse(&layout, page, &cmd),
                        None => Transition::to(State::Terminated(None)),
                    }
                }
                State::AwaitingGoto { page } => {
                    let prompt = format!("Input page number 1..{} (q to quit): ", layout.pages);
                    match self.prompt(&prompt)? {
                        Some(raw) => goto(&layout, page, &raw),
                        None => Transition::to(State::Terminated(None)),
                    }
                }
            };

            if let Some(message) = transition.message {
                writeln!(self.output, "{message}")?;
            }
            state = transition.next;
        }
    }

    fn render<T: Display>(
        &mut self,
        items: &[T],
        layout: &Layout,
        page: usize,
        header: Option<&str>,
    ) -> io::Result<()> {
        let (start, end) = layout.bounds(page);

        if let Some(header) = header {
            writeln!(self.output, "{header}")?;
        }
        writeln!(
            self.output,
            "Page {}/{} ({}-{} of {})",
            page,
            layout.pages,
            start + 1,
            end,
            layout.total
        )?;
        for (offset, item) in items[start..end].iter().enumerate() {
            writeln!(self.output, "{}. {}", start + offset + 1, item)?;
        }
        writeln!(self.output)
    }

    /// Prints `prompt` and reads one normalized line. `None` on end of
    /// input or interruption.
    fn prompt(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        PENDING_PROMPTS.fetch_add(1, Ordering::SeqCst);
        let line = self.input.next_line();
        PENDING_PROMPTS.fetch_sub(1, Ordering::SeqCst);

        match line {
            Ok(Some(line)) => Ok(Some(line.trim().to_lowercase())),
            Ok(None) => {
                writeln!(self.output)?;
                Ok(None)
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                writeln!(self.output)?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

fn nav_prompt(layout: &Layout, page: usize) -> String {
    if layout.selection {
        let (start, end) = layout.bounds(page);
        format!(
            "Select {}..{} | n=next p=prev g=goto b=back q=quit: ",
            start + 1,
            end
        )
    } else {
        "n=next p=prev g=goto b=back q=quit: ".to_string()
    }
}
