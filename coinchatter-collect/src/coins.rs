/// A tracked coin: display name plus exchange ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coin {
    pub name: &'static str,
    pub ticker: &'static str,
}

impl Coin {
    pub const fn new(name: &'static str, ticker: &'static str) -> Self {
        Self { name, ticker }
    }

    /// Search keyword matching either the name or the ticker (case-insensitive
    /// on the provider side). Multi-word names are searched as exact phrases.
    pub fn keyword(&self) -> String {
        format!("({} OR {})", phrase(self.name), phrase(self.ticker))
    }
}

fn phrase(term: &str) -> String {
    if term.contains(char::is_whitespace) {
        format!("\"{term}\"")
    } else {
        term.to_string()
    }
}

pub const COINS: &[Coin] = &[
    Coin::new("Bitcoin", "BTC"),
    Coin::new("Bitcoin Cash", "BCH"),
    Coin::new("Binance Coin", "BNB"),
    Coin::new("EOS.IO", "EOS"),
    Coin::new("Ethereum Classic", "ETC"),
    Coin::new("Ethereum", "ETH"),
    Coin::new("Litecoin", "LTC"),
    Coin::new("Monero", "XMR"),
    Coin::new("TRON", "TRX"),
    Coin::new("Stellar", "XLM"),
    Coin::new("Cardano", "ADA"),
    Coin::new("IOTA", "MIOTA"),
    Coin::new("Maker", "MKR"),
    Coin::new("Dogecoin", "DOGE"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_quote_phrases() {
        assert_eq!(COINS[0].keyword(), "(Bitcoin OR BTC)");
        assert_eq!(COINS[1].keyword(), "(\"Bitcoin Cash\" OR BCH)");
    }

    #[test]
    fn tickers_are_unique() {
        let mut tickers: Vec<_> = COINS.iter().map(|c| c.ticker).collect();
        tickers.sort_unstable();
        tickers.dedup();
        assert_eq!(tickers.len(), COINS.len());
    }
}
