//! The interactive loop: one command at a time, read from any `BufRead` and
//! answered on any `Write`.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;

use tracing::debug;

use voucherdesk_infra::snapshot;
use voucherdesk_infra::Services;
use voucherdesk_vouchers::VoucherType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Create,
    List,
    Blacklist,
    Exit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "create" => Ok(Command::Create),
            "list" => Ok(Command::List),
            "blacklist" => Ok(Command::Blacklist),
            "exit" | "quit" => Ok(Command::Exit),
            other => Err(other.to_string()),
        }
    }
}

const MANUAL: &str = "\
=== Voucher Program ===
Type exit to exit the program.
Type create to create a new voucher.
Type list to list all vouchers.
Type blacklist to list blacklisted customers.";

pub struct Console<R, W> {
    services: Services,
    input: R,
    output: W,
    blacklist: Option<PathBuf>,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(services: Services, input: R, output: W, blacklist: Option<PathBuf>) -> Self {
        Self {
            services,
            input,
            output,
            blacklist,
        }
    }

    /// Run until `exit` or end of input.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "{MANUAL}")?;

        loop {
            let Some(line) = self.prompt("> ")? else {
                break;
            };
            if line.is_empty() {
                continue;
            }

            debug!(command = %line, "console command");
            match line.parse::<Command>() {
                Ok(Command::Create) => self.create().await?,
                Ok(Command::List) => self.list().await?,
                Ok(Command::Blacklist) => self.show_blacklist()?,
                Ok(Command::Exit) => {
                    writeln!(self.output, "Bye.")?;
                    break;
                }
                Err(unknown) => writeln!(self.output, "Unknown command '{unknown}'.\n{MANUAL}")?,
            }
        }
        Ok(())
    }

    async fn create(&mut self) -> anyhow::Result<()> {
        let Some(raw_type) = self.prompt("Voucher type (fixed / percent): ")? else {
            return Ok(());
        };
        let voucher_type: VoucherType = match raw_type.parse() {
            Ok(t) => t,
            Err(e) => {
                writeln!(self.output, "Error: {e}")?;
                return Ok(());
            }
        };

        let Some(amount) = self.prompt("Amount: ")? else {
            return Ok(());
        };
        match self.services.vouchers.create_voucher(voucher_type, &amount).await {
            Ok(v) => {
                let id = v.id_typed().map(|id| id.to_string()).unwrap_or_default();
                writeln!(
                    self.output,
                    "Created {} voucher {id} with value {}.",
                    v.voucher_type().file_tag(),
                    v.value()
                )?;
            }
            Err(e) => writeln!(self.output, "Error: {e}")?,
        }
        Ok(())
    }

    async fn list(&mut self) -> anyhow::Result<()> {
        let vouchers = match self.services.vouchers.get_voucher_list().await {
            Ok(map) => map,
            Err(e) => {
                writeln!(self.output, "Error: {e}")?;
                return Ok(());
            }
        };

        if vouchers.is_empty() {
            writeln!(self.output, "No vouchers yet.")?;
            return Ok(());
        }

        let mut rows: Vec<_> = vouchers.into_iter().collect();
        rows.sort_by_key(|(id, v)| (v.created_at(), id.to_string()));
        for (id, v) in rows {
            writeln!(
                self.output,
                "{id} | {} | {} | {}",
                v.voucher_type().file_tag(),
                v.value(),
                v.created_at().to_rfc3339()
            )?;
        }
        Ok(())
    }

    fn show_blacklist(&mut self) -> anyhow::Result<()> {
        let Some(path) = self.blacklist.as_ref() else {
            writeln!(self.output, "No blacklist file configured (use --blacklist <path>).")?;
            return Ok(());
        };

        match snapshot::read_blacklist(path) {
            Ok(customers) if customers.is_empty() => writeln!(self.output, "The blacklist is empty.")?,
            Ok(customers) => {
                for c in customers {
                    writeln!(self.output, "{} | {} | {}", c.id_typed(), c.name(), c.email())?;
                }
            }
            Err(e) => writeln!(self.output, "Error: {e}")?,
        }
        Ok(())
    }

    /// Print `label` and read one trimmed line; `None` at end of input.
    fn prompt(&mut self, label: &str) -> anyhow::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    async fn session(services: Services, input: &str, blacklist: Option<PathBuf>) -> String {
        let mut out = Vec::new();
        Console::new(services, Cursor::new(input.to_string()), &mut out, blacklist)
            .run()
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn commands_parse_case_insensitively() {
        assert_eq!("CREATE".parse::<Command>(), Ok(Command::Create));
        assert_eq!(" list ".parse::<Command>(), Ok(Command::List));
        assert_eq!("blacklist".parse::<Command>(), Ok(Command::Blacklist));
        assert_eq!("exit".parse::<Command>(), Ok(Command::Exit));
        assert_eq!("delete".parse::<Command>(), Err("delete".to_string()));
    }

    #[tokio::test]
    async fn create_then_list() {
        let services = Services::in_memory();
        let out = session(services.clone(), "create\nfixed\n5000\ncreate\npercent\n50\nlist\nexit\n", None).await;

        assert!(out.contains("Created FixedAmount voucher"));
        assert!(out.contains("Created PercentDiscount voucher"));
        assert!(out.contains("| FixedAmount | 5000 |"));
        assert!(out.contains("| PercentDiscount | 50 |"));
        assert!(out.ends_with("Bye.\n"));
        assert_eq!(services.vouchers.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn errors_are_reported_and_the_loop_continues() {
        let services = Services::in_memory();
        let input = "create\ngift\ncreate\npercent\n150\ncreate\nfixed\nlots\nfrobnicate\nlist\n";
        let out = session(services.clone(), input, None).await;

        assert_eq!(out.matches("Error:").count(), 3);
        assert!(out.contains("Unknown command 'frobnicate'"));
        assert!(out.contains("No vouchers yet."));
        assert_eq!(services.vouchers.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn blacklist_is_printed_from_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("customer_blacklist.csv");
        std::fs::write(
            &path,
            "id,name,email,created_at\n\
             0b0c6c1e-3a5f-4d2b-9c7e-8f1a2b3c4d5e,tester,tester@mail.com,2026-10-19T09:30:00+00:00\n",
        )
        .unwrap();

        let out = session(Services::in_memory(), "blacklist\nexit\n", Some(path)).await;
        assert!(out.contains("0b0c6c1e-3a5f-4d2b-9c7e-8f1a2b3c4d5e | tester | tester@mail.com"));

        let out = session(Services::in_memory(), "blacklist\n", None).await;
        assert!(out.contains("No blacklist file configured"));
    }
}
