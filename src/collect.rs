//! Interactive input collection.
//!
//! Every question offers the closed set of answers for its field; anything
//! else is rejected and asked again. An empty answer takes the default and
//! `exit` ends the session.

use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::record::{
    AddOn, Categorical, InternetService, MONTHLY_CHARGES_MAX, MultipleLines, RawInputRecord,
    TENURE_MAX, TOTAL_CHARGES_MAX, YesNo,
};

const EXIT: &str = "exit";

/// Asks for one record at a time over any line-based reader/writer pair.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    /// Prompter reading answers from `input` and asking on `output`.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consumes the prompter, returning its output sink.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Output sink, for printing between questions.
    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    /// Collects a full record, or `None` once the user types `exit` or input ends.
    ///
    /// Questions that the answers already settle are skipped: multiple lines
    /// without phone service, and the add-on services without internet.
    pub fn collect_record(&mut self) -> io::Result<Option<RawInputRecord>> {
        let defaults = RawInputRecord::default();
        macro_rules! ask {
            ($e:expr) => {
                match $e? {
                    Some(v) => v,
                    None => return Ok(None),
                }
            };
        }

        let gender = ask!(self.choose("Gender", defaults.gender));
        let senior = ask!(self.choose("Senior Citizen", YesNo::No));
        let partner = ask!(self.choose("Has Partner", defaults.partner));
        let dependents = ask!(self.choose("Has Dependents", defaults.dependents));
        let tenure = ask!(self.number("Tenure (months)", 0..=TENURE_MAX, defaults.tenure));

        let phone_service = ask!(self.choose("Phone Service", defaults.phone_service));
        let multiple_lines = if phone_service == YesNo::Yes {
            ask!(self.choose_from(
                "Multiple Lines",
                &[MultipleLines::Yes, MultipleLines::No],
                defaults.multiple_lines,
            ))
        } else {
            MultipleLines::NoPhoneService
        };

        let internet_service = ask!(self.choose("Internet Service", defaults.internet_service));
        let mut addons = [AddOn::NoInternetService; 6];
        if internet_service != InternetService::No {
            let questions = [
                ("Online Security", defaults.online_security),
                ("Online Backup", defaults.online_backup),
                ("Device Protection", defaults.device_protection),
                ("Tech Support", defaults.tech_support),
                ("Streaming TV", defaults.streaming_tv),
                ("Streaming Movies", defaults.streaming_movies),
            ];
            for (slot, (label, default)) in addons.iter_mut().zip(questions) {
                *slot = ask!(self.choose_from(label, &[AddOn::Yes, AddOn::No], default));
            }
        }
        let [
            online_security,
            online_backup,
            device_protection,
            tech_support,
            streaming_tv,
            streaming_movies,
        ] = addons;

        let contract = ask!(self.choose("Contract", defaults.contract));
        let paperless_billing = ask!(self.choose("Paperless Billing", defaults.paperless_billing));
        let payment_method = ask!(self.choose("Payment Method", defaults.payment_method));
        let monthly_charges = ask!(self.number(
            "Monthly Charges",
            0.0..=MONTHLY_CHARGES_MAX,
            defaults.monthly_charges,
        ));
        let total_charges = ask!(self.number(
            "Total Charges",
            0.0..=TOTAL_CHARGES_MAX,
            defaults.total_charges,
        ));

        let record = RawInputRecord {
            gender,
            senior_citizen: senior == YesNo::Yes,
            partner,
            dependents,
            tenure,
            phone_service,
            multiple_lines,
            internet_service,
            online_security,
            online_backup,
            device_protection,
            tech_support,
            streaming_tv,
            streaming_movies,
            contract,
            paperless_billing,
            payment_method,
            monthly_charges,
            total_charges,
        };
        Ok(Some(record.reconciled()))
    }

    /// Reads one trimmed line; `None` on end of input or `exit`.
    fn read_answer(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let line = line.trim();
        if line.eq_ignore_ascii_case(EXIT) {
            return Ok(None);
        }
        Ok(Some(line.to_string()))
    }

    fn choose<T: Categorical>(&mut self, question: &str, default: T) -> io::Result<Option<T>> {
        self.choose_from(question, T::options(), default)
    }

    /// Accepts the option's number or its text.
    fn choose_from<T: Categorical>(
        &mut self,
        question: &str,
        options: &[T],
        default: T,
    ) -> io::Result<Option<T>> {
        loop {
            writeln!(self.output, "{question}:")?;
            for (i, option) in options.iter().enumerate() {
                let marker = if *option == default { " (default)" } else { "" };
                writeln!(self.output, "  {}) {}{marker}", i + 1, option.label())?;
            }
            write!(self.output, "> ")?;
            self.output.flush()?;

            let Some(answer) = self.read_answer()? else {
                return Ok(None);
            };
            if answer.is_empty() {
                return Ok(Some(default));
            }
            let picked = match answer.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => Some(options[n - 1]),
                Ok(_) => None,
                Err(_) => T::from_label(&answer).filter(|v| options.contains(v)),
            };
            match picked {
                Some(v) => return Ok(Some(v)),
                None => writeln!(self.output, "❌ `{answer}` is not one of the options.")?,
            }
        }
    }

    fn number<T>(
        &mut self,
        question: &str,
        range: RangeInclusive<T>,
        default: T,
    ) -> io::Result<Option<T>>
    where
        T: FromStr + PartialOrd + Display + Copy,
    {
        loop {
            write!(
                self.output,
                "{question} [{}-{}] (default {default}): ",
                range.start(),
                range.end()
            )?;
            self.output.flush()?;

            let Some(answer) = self.read_answer()? else {
                return Ok(None);
            };
            if answer.is_empty() {
                return Ok(Some(default));
            }
            match answer.parse::<T>() {
                Ok(v) if range.contains(&v) => return Ok(Some(v)),
                _ => writeln!(
                    self.output,
                    "❌ Enter a number between {} and {}.",
                    range.start(),
                    range.end()
                )?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Contract, Gender, PaymentMethod};
    use std::io::Cursor;

    fn run(script: &str) -> (Option<RawInputRecord>, String) {
        let mut prompter = Prompter::new(Cursor::new(script.as_bytes()), Vec::new());
        let record = prompter.collect_record().unwrap();
        let output = String::from_utf8(prompter.into_output()).unwrap();
        (record, output)
    }

    /// One answer per line, each terminated like typed input.
    fn lines(answers: &[&str]) -> String {
        answers.iter().map(|a| format!("{a}\n")).collect()
    }

    #[test]
    fn defaults_on_empty_answers() {
        // 19 questions with phone and internet service enabled
        let (record, _) = run(&"\n".repeat(19));
        assert_eq!(record.unwrap(), RawInputRecord::default());
    }

    #[test]
    fn numbers_and_labels_are_accepted() {
        let script = [
            "2",           // gender: Male
            "yes",         // senior
            "No",          // partner
            "2",           // dependents: No
            "24",          // tenure
            "No",          // phone service
            "Fiber optic", // internet
            "2", "1", "2", "1", "2", "1", // add-ons
            "3",                // contract: Two year
            "",                 // paperless billing
            "Mailed check",     // payment
            "89.5",             // monthly
            "2148",             // total
        ];
        let (record, _) = run(&lines(&script));
        let record = record.unwrap();

        assert_eq!(record.gender, Gender::Male);
        assert!(record.senior_citizen);
        assert_eq!(record.partner, YesNo::No);
        assert_eq!(record.tenure, 24);
        assert_eq!(record.multiple_lines, MultipleLines::NoPhoneService);
        assert_eq!(record.internet_service, InternetService::FiberOptic);
        assert_eq!(record.online_security, AddOn::No);
        assert_eq!(record.online_backup, AddOn::Yes);
        assert_eq!(record.contract, Contract::TwoYear);
        assert_eq!(record.payment_method, PaymentMethod::MailedCheck);
        assert_eq!(record.monthly_charges, 89.5);
        assert_eq!(record.total_charges, 2148.0);
    }

    #[test]
    fn each_addon_offers_its_own_default() {
        let (_, output) = run(&lines(&[""; 19]));
        let defaults = RawInputRecord::default();
        for (question, default) in [
            ("Online Security", defaults.online_security),
            ("Online Backup", defaults.online_backup),
            ("Device Protection", defaults.device_protection),
            ("Tech Support", defaults.tech_support),
            ("Streaming TV", defaults.streaming_tv),
            ("Streaming Movies", defaults.streaming_movies),
        ] {
            let block: Vec<&str> = output
                .split(&format!("{question}:"))
                .nth(1)
                .unwrap()
                .lines()
                .take(3)
                .collect();
            let marked = block.iter().find(|l| l.ends_with("(default)")).unwrap();
            assert!(marked.contains(default.label()), "{question}: {marked}");
        }
    }

    #[test]
    fn no_internet_skips_addon_questions() {
        let script = [
            "", "", "", "", "", // gender .. tenure
            "",  // phone
            "",  // multiple lines
            "3", // internet: No
            "", "", "", "", "", // contract .. total
        ];
        let (record, output) = run(&lines(&script));
        let record = record.unwrap();

        assert_eq!(record.internet_service, InternetService::No);
        assert_eq!(record.streaming_tv, AddOn::NoInternetService);
        assert!(!output.contains("Online Security"));
    }

    #[test]
    fn out_of_domain_answers_are_asked_again() {
        let mut answers = vec!["", "", "", "", "73", "-1", "72"];
        answers.extend(std::iter::repeat_n("", 14));
        let (record, output) = run(&lines(&answers));

        assert_eq!(record.unwrap().tenure, TENURE_MAX);
        assert_eq!(output.matches("Enter a number between 0 and 72").count(), 2);

        let (record, output) = run("Other\n");
        assert!(record.is_none());
        assert!(output.contains("`Other` is not one of the options"));
    }

    #[test]
    fn exit_ends_collection() {
        let (record, _) = run("1\nexit\n");
        assert!(record.is_none());
    }
}
