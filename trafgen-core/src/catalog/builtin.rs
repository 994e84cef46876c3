//! Built-in site, payload and user agent database.

pub(super) const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 11.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_1) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:120.0) Gecko/20100101 Firefox/120.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:120.0) Gecko/20100101 Firefox/120.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_1) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Android 14; Mobile; rv:121.0) Gecko/121.0 Firefox/121.0",
    "Mozilla/5.0 (Linux; Android 14; SM-G998B) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36",
    // Legacy clients, preferred by compromised hosts.
    "Mozilla/5.0 (Windows NT 6.1; WOW64; Trident/7.0; rv:11.0) like Gecko",
    "Mozilla/5.0 (Windows NT 6.1; WOW64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.36",
    "Mozilla/5.0 (Windows NT 6.3; WOW64; rv:52.0) Gecko/20100101 Firefox/52.0",
];

pub(super) const SITES: &[(&str, &str)] = &[
    ("https://www.google.com", "search"),
    ("https://www.bing.com", "search"),
    ("https://duckduckgo.com", "search"),
    ("https://www.yahoo.com", "search"),
    ("https://search.brave.com", "search"),
    ("https://www.startpage.com", "search"),
    ("https://www.facebook.com", "social"),
    ("https://www.twitter.com", "social"),
    ("https://www.instagram.com", "social"),
    ("https://www.linkedin.com", "social"),
    ("https://www.reddit.com", "social"),
    ("https://www.pinterest.com", "social"),
    ("https://www.discord.com", "social"),
    ("https://signal.org", "social"),
    ("https://www.youtube.com", "video"),
    ("https://www.netflix.com", "video"),
    ("https://www.twitch.tv", "video"),
    ("https://vimeo.com", "video"),
    ("https://www.dailymotion.com", "video"),
    ("https://www.cnn.com", "news"),
    ("https://www.bbc.com", "news"),
    ("https://www.reuters.com", "news"),
    ("https://www.nytimes.com", "news"),
    ("https://www.theguardian.com", "news"),
    ("https://www.npr.org", "news"),
    ("https://www.bloomberg.com", "news"),
    ("https://news.ycombinator.com", "news"),
    ("https://www.amazon.com", "shopping"),
    ("https://www.ebay.com", "shopping"),
    ("https://www.walmart.com", "shopping"),
    ("https://www.target.com", "shopping"),
    ("https://www.bestbuy.com", "shopping"),
    ("https://www.etsy.com", "shopping"),
    ("https://www.microsoft.com", "technology"),
    ("https://www.apple.com", "technology"),
    ("https://www.github.com", "technology"),
    ("https://stackoverflow.com", "technology"),
    ("https://www.techcrunch.com", "technology"),
    ("https://www.wired.com", "technology"),
    ("https://www.theverge.com", "technology"),
    ("https://arstechnica.com", "technology"),
    ("https://gitlab.com", "technology"),
    ("https://aws.amazon.com", "cloud"),
    ("https://cloud.google.com", "cloud"),
    ("https://azure.microsoft.com", "cloud"),
    ("https://www.dropbox.com", "cloud"),
    ("https://www.box.com", "cloud"),
    ("https://www.notion.so", "cloud"),
    ("https://slack.com", "cloud"),
    ("https://zoom.us", "cloud"),
    ("https://www.wikipedia.org", "education"),
    ("https://www.coursera.org", "education"),
    ("https://www.edx.org", "education"),
    ("https://www.khanacademy.org", "education"),
    ("https://www.duolingo.com", "education"),
    ("https://www.spotify.com", "entertainment"),
    ("https://www.imdb.com", "entertainment"),
    ("https://www.ign.com", "entertainment"),
    ("https://www.epicgames.com", "entertainment"),
    ("https://www.roblox.com", "entertainment"),
    ("https://www.paypal.com", "finance"),
    ("https://stripe.com", "finance"),
    ("https://www.coinbase.com", "finance"),
    ("https://www.chase.com", "finance"),
    ("https://www.bankofamerica.com", "finance"),
    ("https://www.booking.com", "travel"),
    ("https://www.expedia.com", "travel"),
    ("https://www.airbnb.com", "travel"),
    ("https://www.tripadvisor.com", "travel"),
    ("https://www.uber.com", "travel"),
    ("https://www.webmd.com", "health"),
    ("https://www.mayoclinic.org", "health"),
    ("https://www.healthline.com", "health"),
    ("https://www.strava.com", "health"),
    ("https://www.cdc.gov", "government"),
    ("https://www.nih.gov", "government"),
    ("https://www.nasa.gov", "government"),
    ("https://www.weather.gov", "government"),
    ("https://www.who.int", "government"),
    ("https://weather.com", "utilities"),
    ("https://www.openstreetmap.org", "utilities"),
    ("https://www.quora.com", "forums"),
    ("https://medium.com", "forums"),
    ("https://www.torproject.org", "privacy"),
    ("https://proton.me", "privacy"),
    ("https://bitcoin.org", "crypto"),
    ("https://ethereum.org", "crypto"),
    ("https://www.naver.com", "international"),
    ("https://www.weibo.com", "international"),
    ("https://line.me", "international"),
];

/// Categories missing here weigh 1.
pub(super) const CATEGORY_WEIGHTS: &[(&str, u32)] = &[
    ("search", 4),
    ("social", 3),
    ("video", 3),
    ("news", 2),
    ("shopping", 2),
    ("technology", 2),
    ("cloud", 2),
];

pub(super) const SQL_INJECTION: &[&str] = &["' OR 1=1--", "'; DROP TABLE users;--", "admin'--"];
pub(super) const XSS: &[&str] = &["<script>alert('XSS')</script>", "<img src=x onerror=alert(1)>"];
pub(super) const PATH_TRAVERSAL: &[&str] = &["../../../etc/passwd", "..\\..\\..\\windows\\system32\\"];
pub(super) const COMMAND_INJECTION: &[&str] = &["; cat /etc/passwd", "| whoami", "&& dir"];

pub(super) const ATTACK_TARGETS: &[&str] = &[
    "http://testmyids.com",
    "http://malicious.example",
    "http://phishing.example",
    "http://trojan.example",
    "http://botnet.example",
    "http://exploit.example",
];

/// Never resolvable: `.example` and `.invalid` are reserved names.
pub(super) const C2_DOMAINS: &[&str] = &[
    "c2.evil.example",
    "command.malicious.invalid",
    "control.bad.example",
    "backdoor.example",
    "rat.controller.invalid",
    "beacon.attacker.example",
];
