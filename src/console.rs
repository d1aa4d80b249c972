//! Line-oriented prompting over any reader and writer.

use hms_core::{HmsError, HmsResult};
use std::fmt::Display;
use std::io::{BufRead, Write};

pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Write `text` followed by a newline.
    pub fn say(&mut self, text: impl Display) -> HmsResult<()> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    /// Show `prompt` and read one line without its line ending.
    ///
    /// End of input is reported as [`HmsError::InputClosed`].
    pub fn read_line(&mut self, prompt: &str) -> HmsResult<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(HmsError::InputClosed);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Prompt until `parse` accepts the answer, echoing each rejection.
    pub fn prompt_validated<T>(
        &mut self,
        prompt: &str,
        parse: impl Fn(&str) -> HmsResult<T>,
    ) -> HmsResult<T> {
        loop {
            let line = self.read_line(prompt)?;
            match parse(line.trim()) {
                Ok(value) => return Ok(value),
                Err(e @ (HmsError::InputClosed | HmsError::Console(_))) => return Err(e),
                Err(e) => self.say(format!("  {e}"))?,
            }
        }
    }

    /// Prompt for a menu number in `1..=max`.
    pub fn choose(&mut self, prompt: &str, max: usize) -> HmsResult<usize> {
        self.prompt_validated(prompt, |raw| match raw.parse::<usize>() {
            Ok(n) if (1..=max).contains(&n) => Ok(n),
            _ => Err(HmsError::InvalidInput(format!(
                "enter a number between 1 and {max}"
            ))),
        })
    }

    /// Show a numbered menu with `0` as the way out and read a choice in
    /// `0..=options.len()`.
    pub fn menu(&mut self, title: &str, options: &[&str], exit_label: &str) -> HmsResult<usize> {
        self.say("")?;
        self.say(format!("--- {title} ---"))?;
        for (i, option) in options.iter().enumerate() {
            self.say(format!("{}. {option}", i + 1))?;
        }
        self.say(format!("0. {exit_label}"))?;
        let max = options.len();
        self.prompt_validated("Select an option: ", |raw| match raw.parse::<usize>() {
            Ok(n) if n <= max => Ok(n),
            _ => Err(HmsError::InvalidInput(format!(
                "invalid option, enter 0 to {max}"
            ))),
        })
    }

    pub fn confirm(&mut self, prompt: &str) -> HmsResult<bool> {
        self.prompt_validated(prompt, |raw| match raw.to_ascii_lowercase().as_str() {
            "y" | "yes" => Ok(true),
            "n" | "no" => Ok(false),
            _ => Err(HmsError::InvalidInput("answer y or n".into())),
        })
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn console(input: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn end_of_input_is_input_closed() {
        let mut console = console("");
        assert!(matches!(
            console.read_line("> "),
            Err(HmsError::InputClosed)
        ));
    }

    #[test]
    fn choose_reprompts_until_in_range() {
        let mut console = console("0\nabc\n7\n2\r\n");
        assert_eq!(console.choose("Pick: ", 3).unwrap(), 2);

        let out = String::from_utf8(console.into_output()).unwrap();
        assert_eq!(out.matches("Pick: ").count(), 4);
        assert!(out.contains("between 1 and 3"));
    }

    #[test]
    fn menu_accepts_zero_as_exit() {
        let mut console = console("9\n0\n");
        assert_eq!(console.menu("Main", &["One", "Two"], "Exit").unwrap(), 0);

        let out = String::from_utf8(console.into_output()).unwrap();
        assert!(out.contains("--- Main ---\n1. One\n2. Two\n0. Exit\n"));
        assert!(out.contains("invalid option, enter 0 to 2"));
    }

    #[test]
    fn confirm_accepts_words_and_letters() {
        let mut console = console("maybe\nYES\nn\n");
        assert!(console.confirm("? ").unwrap());
        assert!(!console.confirm("? ").unwrap());
    }

    #[test]
    fn validated_prompt_gives_up_on_closed_input() {
        let mut console = console("bad\n");
        let result = console.prompt_validated("> ", |_| -> HmsResult<u8> {
            Err(HmsError::InvalidInput("nope".into()))
        });
        assert!(matches!(result, Err(HmsError::InputClosed)));
    }
}
