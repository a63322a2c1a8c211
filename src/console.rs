use std::io::{self, BufRead, Write};
use std::str::FromStr;

use coffee_counter::numeric::CurrencyAmount;
use coffee_counter::request::is_available;

/// Line-oriented prompts over any reader/writer pair.
pub struct Console<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn say(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{}", text)
    }

    /// Prints `prompt` and returns the next line without its line ending.
    ///
    /// Running out of input is an `UnexpectedEof` error, which ends the
    /// session.
    pub fn ask(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed",
            ));
        }
        Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
    }

    /// Asks until the answer is a number from 1 to `options`.
    pub fn choose(&mut self, prompt: &str, options: usize, who: &str) -> io::Result<usize> {
        let valid = (1..=options)
            .map(|option| option.to_string())
            .collect::<Vec<_>>()
            .join(" or ");

        loop {
            let answer = self.ask(prompt)?;
            match answer.trim().parse::<usize>() {
                Ok(choice) if (1..=options).contains(&choice) => {
                    log::debug!("{} chose {}", who, choice);
                    self.say(&format!("Your choice is {}\n", choice))?;
                    return Ok(choice);
                }
                Ok(_) => {
                    self.say(&format!("{}, that is not:\n{}\nTry again!\n", who, valid))?;
                }
                Err(_) => {
                    self.say(&format!(
                        "{}, you can input only numbers. Enter:\n{}\n",
                        who, valid
                    ))?;
                }
            }
        }
    }

    /// Asks for an item until the answer is one of `available` (any case).
    pub fn pick(&mut self, item: &str, available: &[String]) -> io::Result<String> {
        loop {
            self.say(&format!("You can sell the following {}s:", item))?;
            for option in available {
                self.say(option)?;
            }
            let answer = self.ask(&format!("Enter {} name: \n", item))?;
            let answer = answer.trim();
            if is_available(answer, available) {
                return Ok(answer.to_string());
            }
            log::debug!("Unavailable {} entered: {}", item, answer);
            self.say(&format!(
                "You can sell only:\n{}\nTry again!\n",
                available.join(" or ")
            ))?;
        }
    }

    /// Asks for a price until the answer is a number from zero up to
    /// [`CurrencyAmount::max_price`].
    pub fn price(&mut self, item: &str) -> io::Result<CurrencyAmount> {
        loop {
            let answer = self.ask(&format!("Enter {} price: \n", item))?;
            match CurrencyAmount::from_str(answer.trim()) {
                Ok(price) if price.is_negative() => {
                    self.say("You can enter only positive integers or floats.\nTry Again!")?;
                }
                Ok(price) if !price.is_valid_price() => {
                    log::debug!("Price {} above the limit entered for {}", price, item);
                    self.say(&format!(
                        "The price cannot be above {}$.\nTry again!",
                        CurrencyAmount::max_price()
                    ))?;
                }
                Ok(price) => return Ok(price),
                Err(_) => {
                    self.say(&format!(
                        "\"{}\" is not a number. You can enter only positive integers or floats\nTry again!",
                        answer
                    ))?;
                }
            }
        }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }
}
