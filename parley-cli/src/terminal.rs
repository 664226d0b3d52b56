//! Line-oriented front-end
//!
//! Prints each query's display text and answers it with the next input line.
//! An invalid answer is left attached; the engine re-sends the query on its
//! next round.

use parley_common::{Error, Filter, Identity, QueryRef, QueryStore, Recipient, Result};
use std::io::{BufRead, Write};
use tracing::{debug, warn};

pub const PROMPT: &str = "> ";

pub struct Terminal<I: BufRead, O: Write> {
    name: String,
    store: QueryStore,
    input: I,
    output: O,
}

impl<I: BufRead, O: Write> Terminal<I, O> {
    pub fn new(name: impl Into<String>, input: I, output: O) -> Self {
        let name = name.into();
        Terminal {
            store: QueryStore::new(&name),
            name,
            input,
            output,
        }
    }

    /// Queries received so far, repeats erased
    pub fn store(&self) -> &QueryStore {
        &self.store
    }

    pub fn into_output(self) -> O {
        self.output
    }

    /// Next input line without its line ending; end of input is an error
    fn read_answer(&mut self) -> Result<String> {
        write!(self.output, "{}", PROMPT)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(Error::Recipient {
                recipient: self.name.clone(),
                reason: "input closed".to_string(),
            });
        }
        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    }

    fn ask(&mut self, query: &QueryRef) -> Result<()> {
        loop {
            let answer = self.read_answer()?;
            match query.reply_to(answer) {
                Ok(true) => return Ok(()),
                Ok(false) => {
                    let query = query.borrow();
                    if query.reply().is_some_and(|reply| reply.is_help_request()) {
                        writeln!(self.output, "{}", query.display_text())?;
                        continue;
                    }
                    writeln!(self.output, "Not a valid answer.")?;
                    if let Some(tip) = query.input_tip() {
                        writeln!(self.output, "{}", tip)?;
                    }
                    return Ok(());
                }
                Err(Error::UnmetPrerequisite { query, prerequisite }) => {
                    warn!("'{}' answered before '{}', dropping the answer", query, prerequisite);
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl<I: BufRead, O: Write> Identity for Terminal<I, O> {
    fn name(&self) -> &str {
        &self.name
    }
}

impl<I: BufRead, O: Write> Recipient for Terminal<I, O> {
    fn receive(&mut self, query: QueryRef) -> Result<()> {
        self.store.store(query);
        self.store.erase_repeated(&[Filter::ToOwner]);
        Ok(())
    }

    fn execute_queries(&mut self, queries: &[QueryRef]) -> Result<()> {
        for query in queries {
            let ready = query
                .borrow()
                .prerequisites()
                .iter()
                .all(|prerequisite| prerequisite.borrow().is_satisfied());
            if !ready {
                debug!("{} holds '{}' until its prerequisites are answered", self.name, query.name());
                continue;
            }

            let text = query.borrow().display_text().to_string();
            if !text.is_empty() {
                writeln!(self.output, "{}", text)?;
            }
            if query.borrow().expect_reply() {
                self.ask(query)?;
            }
        }
        self.output.flush()?;
        Ok(())
    }
}
