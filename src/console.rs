//! The interactive menu a user drives from a terminal.
//!
//! The controller owns no evaluation or storage logic; it reads lines,
//! calls the equation API and an [`EquationRepository`], and reports.
//! Input and output are generic so a whole session can be scripted in a
//! test.

use crate::{
    equation::{
        check_equation_equality, validate_equation_syntax, DEFAULT_ROOT_NAME,
    },
    store::{EquationRecord, EquationRepository, StoreError},
};
use log::debug;
use std::{
    collections::{HashMap, HashSet},
    error::Error,
    io::{self, BufRead, Write},
};

const GREETING: &str = "Welcome to the equation checker.";

const MAIN_MENU: &str = "\nMenu:\n\
                         1. Enter a new equation\n\
                         2. Select a stored equation\n\
                         3. Enter candidate roots\n\
                         4. Search stored equations\n\
                         5. Help\n\
                         6. Quit\n";

const HELP_TEXT: &str = "\
An equation is two expressions joined by a single \"=\", written with\n\
numbers, the unknown \"x\", parentheses and the operators + - * /,\n\
for example: 1 + 2 * (3 - x) = 4 / x\n\
\n\
Enter an equation to validate and store it, then enter candidate root\n\
values for it; every value that balances the equation is saved. Stored\n\
equations can be searched by their saved roots later.";

#[derive(Debug, Copy, Clone, PartialEq)]
enum MenuItem {
    EnterEquation,
    SelectEquation,
    EnterRoots,
    Search,
    Help,
    Quit,
}

impl MenuItem {
    fn from_number(number: usize) -> Option<MenuItem> {
        match number {
            1 => Some(MenuItem::EnterEquation),
            2 => Some(MenuItem::SelectEquation),
            3 => Some(MenuItem::EnterRoots),
            4 => Some(MenuItem::Search),
            5 => Some(MenuItem::Help),
            6 => Some(MenuItem::Quit),
            _ => None,
        }
    }
}

/// The menu loop, wired to its input, output and store.
pub struct Console<R, W, S> {
    input: R,
    output: W,
    store: S,
    current: Option<EquationRecord>,
}

impl<R, W, S> Console<R, W, S>
where
    R: BufRead,
    W: Write,
    S: EquationRepository,
{
    pub fn new(input: R, output: W, store: S) -> Self {
        Console {
            input,
            output,
            store,
            current: None,
        }
    }

    /// Hand the store back, e.g. to inspect it after a scripted session.
    pub fn into_store(self) -> S { self.store }

    /// Run the menu loop until the user quits or input ends.
    pub fn run(&mut self) -> Result<(), Box<dyn Error>> {
        writeln!(self.output, "{}", GREETING)?;

        loop {
            let item = match self.ask_for_menu_item()? {
                Some(item) => item,
                None => break,
            };
            debug!("menu item selected: {:?}", item);

            match item {
                MenuItem::EnterEquation => self.enter_equation()?,
                MenuItem::SelectEquation => self.select_equation()?,
                MenuItem::EnterRoots => self.enter_roots()?,
                MenuItem::Search => self.search()?,
                MenuItem::Help => writeln!(self.output, "{}", HELP_TEXT)?,
                MenuItem::Quit => {
                    writeln!(self.output, "Goodbye!")?;
                    break;
                },
            }
        }

        Ok(())
    }

    fn enter_equation(&mut self) -> Result<(), Box<dyn Error>> {
        let text = match self
            .ask_for_line("Enter an equation (empty line cancels): ")?
        {
            Some(text) => text,
            None => {
                writeln!(self.output, "No equation entered.")?;
                return Ok(());
            },
        };

        let mut names = HashSet::new();
        names.insert(String::from(DEFAULT_ROOT_NAME));

        match validate_equation_syntax(&text, &names) {
            Ok(()) => {
                let saved = self.store.save_new_equation(&text)?;
                writeln!(
                    self.output,
                    "The equation was saved under id {} and is now current; \
                     you can enter roots for it.",
                    saved.id
                )?;
                self.current = Some(saved);
            },
            Err(e) => {
                writeln!(
                    self.output,
                    "The equation did not pass validation: {}",
                    e
                )?;
            },
        }

        Ok(())
    }

    fn select_equation(&mut self) -> Result<(), Box<dyn Error>> {
        self.report_current_equation()?;

        let id = match self.ask_for_u64("Enter a stored equation id: ")? {
            Some(id) => id,
            None => {
                writeln!(self.output, "No id entered.")?;
                return Ok(());
            },
        };

        match self.store.find_equation_by_id(id) {
            Some(equation) => {
                writeln!(
                    self.output,
                    "Equation #{} is now current: {}",
                    equation.id, equation.expression
                )?;

                let roots = self.store.find_roots_by_equation_id(equation.id);
                if roots.is_empty() {
                    writeln!(self.output, "It has no saved roots yet.")?;
                } else {
                    writeln!(self.output, "Saved roots:")?;
                    for (index, root) in roots.iter().enumerate() {
                        writeln!(
                            self.output,
                            "  {}: {}",
                            index + 1,
                            root.value
                        )?;
                    }
                }

                self.current = Some(equation);
            },
            None => {
                writeln!(self.output, "No equation is stored under id {}.", id)?;
            },
        }

        Ok(())
    }

    fn enter_roots(&mut self) -> Result<(), Box<dyn Error>> {
        self.report_current_equation()?;

        let equation = match &self.current {
            Some(equation) => equation.clone(),
            None => {
                writeln!(
                    self.output,
                    "Enter an equation or select one by id first."
                )?;
                return Ok(());
            },
        };

        loop {
            let candidate = match self.ask_for_f64(
                "Enter a candidate root for \"x\" (empty line finishes): ",
            )? {
                Some(candidate) => candidate,
                None => {
                    writeln!(self.output, "Done entering roots.")?;
                    return Ok(());
                },
            };

            let mut bindings = HashMap::new();
            bindings.insert(String::from(DEFAULT_ROOT_NAME), candidate);

            if check_equation_equality(&equation.expression, &bindings)? {
                writeln!(self.output, "The value is a root of the equation.")?;

                match self.store.save_new_root(equation.id, candidate) {
                    Ok(_) => writeln!(self.output, "The root was saved.")?,
                    Err(StoreError::DuplicateRoot) => writeln!(
                        self.output,
                        "This root is already saved for the equation."
                    )?,
                    Err(e) => return Err(e.into()),
                }
            } else {
                writeln!(
                    self.output,
                    "The value is not a root of the equation, so it was \
                     not saved."
                )?;
            }
        }
    }

    fn search(&mut self) -> Result<(), Box<dyn Error>> {
        writeln!(self.output, "Search modes:")?;
        writeln!(self.output, "  1: by saved root values (default)")?;
        writeln!(self.output, "  2: equations with exactly one saved root")?;

        let mode = match self
            .ask_for_number_in_range("Enter a search mode: ", 1, 2, 1)?
        {
            Some(mode) => mode,
            None => return Ok(()),
        };

        if mode == 1 {
            loop {
                let value = match self.ask_for_f64(
                    "Enter a root value to search for (empty line \
                     finishes): ",
                )? {
                    Some(value) => value,
                    None => {
                        writeln!(self.output, "Done searching.")?;
                        return Ok(());
                    },
                };

                let found = self.store.find_equations_by_root_value(value);
                self.report_found_equations(&found)?;
            }
        } else {
            let found = self.store.find_equations_with_single_saved_root();
            self.report_found_equations(&found)?;
        }

        Ok(())
    }

    fn report_current_equation(&mut self) -> io::Result<()> {
        match &self.current {
            Some(equation) => writeln!(
                self.output,
                "Current equation (#{}): {}",
                equation.id, equation.expression
            ),
            None => writeln!(self.output, "No equation is current."),
        }
    }

    fn report_found_equations(
        &mut self,
        found: &[EquationRecord],
    ) -> io::Result<()> {
        if found.is_empty() {
            writeln!(self.output, "Nothing matched.")
        } else {
            writeln!(self.output, "Found:")?;
            for equation in found {
                writeln!(
                    self.output,
                    "  #{}: {}",
                    equation.id, equation.expression
                )?;
            }
            Ok(())
        }
    }

    /// Print the menu and read an item number. An empty line picks the
    /// first item; anything unparseable re-prompts. `None` means input
    /// ended.
    fn ask_for_menu_item(&mut self) -> Result<Option<MenuItem>, io::Error> {
        loop {
            write!(
                self.output,
                "{}Pick a menu item (default 1): ",
                MAIN_MENU
            )?;
            self.output.flush()?;

            let line = match self.read_line()? {
                Some(line) => line,
                None => return Ok(None),
            };

            if line.is_empty() {
                return Ok(Some(MenuItem::EnterEquation));
            }

            match line.parse().ok().and_then(MenuItem::from_number) {
                Some(item) => return Ok(Some(item)),
                None => {
                    writeln!(self.output, "There is no such menu item.")?;
                },
            }
        }
    }

    /// Prompt for a whole number between `min` and `max`. An empty line
    /// picks `default`; end of input returns `None`.
    fn ask_for_number_in_range(
        &mut self,
        prompt: &str,
        min: usize,
        max: usize,
        default: usize,
    ) -> Result<Option<usize>, io::Error> {
        loop {
            write!(self.output, "{}", prompt)?;
            self.output.flush()?;

            let line = match self.read_line()? {
                Some(line) => line,
                None => return Ok(None),
            };

            if line.is_empty() {
                return Ok(Some(default));
            }

            match line.parse::<usize>() {
                Ok(number) if number >= min && number <= max => {
                    return Ok(Some(number));
                },
                _ => {
                    writeln!(
                        self.output,
                        "Enter a number between {} and {}.",
                        min, max
                    )?;
                },
            }
        }
    }

    /// Prompt for a decimal number. An empty line (or end of input)
    /// returns `None`; anything unparseable re-prompts.
    fn ask_for_f64(
        &mut self,
        prompt: &str,
    ) -> Result<Option<f64>, io::Error> {
        loop {
            write!(self.output, "{}", prompt)?;
            self.output.flush()?;

            let line = match self.read_line()? {
                Some(line) => line,
                None => return Ok(None),
            };

            if line.is_empty() {
                return Ok(None);
            }

            match line.parse() {
                Ok(value) => return Ok(Some(value)),
                Err(_) => {
                    writeln!(self.output, "That is not a number.")?;
                },
            }
        }
    }

    /// Prompt for an id. Same empty-line and re-prompt rules as
    /// [`Console::ask_for_f64`].
    fn ask_for_u64(
        &mut self,
        prompt: &str,
    ) -> Result<Option<u64>, io::Error> {
        loop {
            write!(self.output, "{}", prompt)?;
            self.output.flush()?;

            let line = match self.read_line()? {
                Some(line) => line,
                None => return Ok(None),
            };

            if line.is_empty() {
                return Ok(None);
            }

            match line.parse() {
                Ok(id) => return Ok(Some(id)),
                Err(_) => {
                    writeln!(self.output, "That is not an id.")?;
                },
            }
        }
    }

    /// Prompt for one free-form line. Empty input (or end of input)
    /// returns `None`.
    fn ask_for_line(
        &mut self,
        prompt: &str,
    ) -> Result<Option<String>, io::Error> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        Ok(self.read_line()?.filter(|line| !line.is_empty()))
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        Ok(Some(line.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{JsonStore, RootRecord};
    use std::{
        fs,
        io::Cursor,
        path::PathBuf,
        sync::atomic::{AtomicUsize, Ordering},
    };

    static NEXT_FILE: AtomicUsize = AtomicUsize::new(0);

    fn scratch_file() -> PathBuf {
        let unique = NEXT_FILE.fetch_add(1, Ordering::SeqCst);

        std::env::temp_dir().join(format!(
            "eqcheck-console-{}-{}.json",
            std::process::id(),
            unique
        ))
    }

    fn run_session(script: &str, store: JsonStore) -> (String, JsonStore) {
        let mut output = Vec::new();
        let mut console =
            Console::new(Cursor::new(script.as_bytes()), &mut output, store);

        console.run().unwrap();

        let store = console.into_store();
        (String::from_utf8(output).unwrap(), store)
    }

    #[test]
    fn a_valid_equation_and_root_are_saved() {
        let path = scratch_file();
        let store = JsonStore::open(path.clone()).unwrap();

        let (output, store) =
            run_session("1\n2*x+5=17\n3\n6\n\n6\n", store);

        assert!(output.contains("saved under id 1"));
        assert!(output.contains("The value is a root of the equation."));
        assert!(output.contains("The root was saved."));

        let saved = store.find_equation_by_id(1).unwrap();
        assert_eq!(saved.expression, "2*x+5=17");
        let roots: Vec<RootRecord> = store.find_roots_by_equation_id(1);
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].value, 6.0);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn an_invalid_equation_is_reported_and_not_saved() {
        let path = scratch_file();
        let store = JsonStore::open(path.clone()).unwrap();

        let (output, store) = run_session("1\n1 - * 2 = x\n6\n", store);

        assert!(output.contains("did not pass validation"));
        assert!(store.find_equation_by_id(1).is_none());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn a_wrong_candidate_is_not_saved_as_a_root() {
        let path = scratch_file();
        let store = JsonStore::open(path.clone()).unwrap();

        let (output, store) =
            run_session("1\nx = 1\n3\n2\n\n6\n", store);

        assert!(output.contains("not a root of the equation"));
        assert!(store.find_roots_by_equation_id(1).is_empty());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn a_duplicate_root_is_reported() {
        let path = scratch_file();
        let store = JsonStore::open(path.clone()).unwrap();

        let (output, store) =
            run_session("1\nx = 1\n3\n1\n1\n\n6\n", store);

        assert!(output.contains("already saved"));
        assert_eq!(store.find_roots_by_equation_id(1).len(), 1);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn searching_by_root_value_lists_matches() {
        let path = scratch_file();
        let store = JsonStore::open(path.clone()).unwrap();

        let (output, _store) = run_session(
            "1\n2*x+5=17\n3\n6\n\n4\n1\n6\n\n6\n",
            store,
        );

        assert!(output.contains("Found:"));
        assert!(output.contains("#1: 2*x+5=17"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn end_of_input_quits_the_loop() {
        let path = scratch_file();
        let store = JsonStore::open(path.clone()).unwrap();

        let (output, _store) = run_session("", store);

        assert!(output.contains("Welcome"));
    }
}
