mod app;
mod config;
mod core;

use std::io::{self, BufRead, Write};

use crate::app::ayahs::AyahListController;
use crate::app::search::SearchController;
use crate::app::surahs::SurahListController;
use crate::app::viewport::{row_layout, ListViewport, NotMeasured};
use crate::config::Config;
use crate::core::client::QuranApi;
use crate::core::models::Surah;
use crate::core::store::CacheHandle;

/// Terminal rendering of the chapter list. Every row is "measured" the
/// moment we print it, so direct positional scrolls always land.
struct TermViewport<'a> {
    rows: &'a [Surah],
}

impl ListViewport for TermViewport<'_> {
    fn scroll_to_index(&mut self, index: usize) -> Result<(), NotMeasured> {
        let end = (index + 10).min(self.rows.len());
        for surah in &self.rows[index..end] {
            print_surah(surah);
        }
        Ok(())
    }

    fn scroll_to_offset(&mut self, offset: f32) {
        let mut row = 0;
        while row + 1 < self.rows.len() && row_layout(row + 1).offset <= offset {
            row += 1;
        }
        let _ = self.scroll_to_index(row);
    }

    fn measured_row_heights(&self) -> Vec<f32> {
        Vec::new()
    }
}

fn print_surah(surah: &Surah) {
    println!(
        "{:>3}. {} — {} ({} ayahs)",
        surah.number, surah.english_name, surah.name, surah.number_of_ayahs
    );
}

fn print_help() {
    println!("commands:");
    println!("  index          load and show the chapter index");
    println!("  jump <n>       jump to chapter n (1-114)");
    println!("  hydrate        fetch and cache the full text");
    println!("  search <term>  filter chapters by English name");
    println!("  search         clear the filter");
    println!("  open <n>       read chapter n from the cache");
    println!("  more           show the next page (verses, or listing)");
    println!("  refresh        re-read the open chapter from the cache");
    println!("  quit");
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = Config::resolve();
    let cache = match config.cache_dir.as_deref() {
        Some(dir) => CacheHandle::open_in(dir),
        None => CacheHandle::open(),
    };
    let cache = match cache {
        Ok(cache) => cache,
        Err(e) => {
            log::error!("Cannot open cache: {}", e);
            return;
        }
    };
    let api = QuranApi::new(&config);

    let mut surahs = SurahListController::new();
    let mut search = SearchController::new();
    let mut reader: Option<AyahListController> = None;

    print_help();
    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let line = line.trim();
        let (cmd, arg) = match line.split_once(' ') {
            Some((c, a)) => (c, a.trim()),
            None => (line, ""),
        };

        match cmd {
            "quit" | "exit" => break,
            "help" => print_help(),

            "index" => {
                if surahs.index().is_empty() {
                    surahs.load_index(&api).await;
                }
                for surah in surahs.index() {
                    print_surah(surah);
                }
                if let Some(e) = surahs.last_error() {
                    println!("{e}");
                }
            }

            "jump" => {
                surahs.set_jump_input(arg);
                let index = surahs.index().to_vec();
                let mut view = TermViewport { rows: &index };
                match surahs.submit_jump(&mut view) {
                    Ok((pos, _)) => println!("(row {pos})"),
                    Err(e) => println!("{e}"),
                }
            }

            "hydrate" => match search.hydrate(&api, &cache).await {
                Some(outcome) => println!("{outcome:?}"),
                None => println!("hydration already running"),
            },

            "search" => {
                search.set_search_term(arg);
                for surah in search.listing() {
                    print_surah(surah);
                }
                if search.index_len() == 0 {
                    println!("(no chapters — run `hydrate` first)");
                }
            }

            "open" => {
                let number: u16 = match arg.parse() {
                    Ok(n) => n,
                    Err(_) => {
                        println!("usage: open <1-114>");
                        continue;
                    }
                };
                let surah = surahs
                    .index()
                    .iter()
                    .chain(search.listing().into_iter())
                    .find(|s| s.number == number)
                    .cloned()
                    .unwrap_or(Surah {
                        number,
                        name: String::new(),
                        english_name: format!("Surah {number}"),
                        number_of_ayahs: 0,
                    });

                let mut controller = AyahListController::new(surah);
                controller.load_all(&cache).await;
                print_reader(&controller);
                reader = Some(controller);
            }

            "more" => {
                if let Some(controller) = reader.as_mut() {
                    if let Some(pending) = controller.begin_load_more() {
                        controller.complete_load_more(pending);
                    }
                    print_reader(controller);
                } else if let Some(pending) = search.begin_load_more() {
                    search.complete_load_more(pending);
                    for surah in search.listing() {
                        print_surah(surah);
                    }
                } else {
                    println!("nothing to page");
                }
            }

            "refresh" => {
                if let Some(controller) = reader.as_mut() {
                    controller.refresh(&cache).await;
                    print_reader(controller);
                } else {
                    println!("no chapter open");
                }
            }

            "" => {}
            other => println!("unknown command: {other} (try `help`)"),
        }
    }
}

fn print_reader(controller: &AyahListController) {
    println!("{} — {}", controller.surah().english_name, controller.status_line());
    for ayah in controller.visible() {
        println!("{:>3}. {}", ayah.number_in_surah, ayah.text);
        if !ayah.translation.is_empty() {
            println!("     {}", ayah.translation);
        }
    }
    if let Some(e) = controller.last_error() {
        println!("{e}");
    }
}
