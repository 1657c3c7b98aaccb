//! Word lists backing the entity tagger.

use std::collections::HashSet;

lazy_static::lazy_static! {
    pub static ref COUNTRIES_AND_PLACES: HashSet<&'static str> = [
        // countries
        "Afghanistan", "Albania", "Algeria", "Argentina", "Armenia", "Australia", "Austria",
        "Azerbaijan", "Bahrain", "Bangladesh", "Belarus", "Belgium", "Bolivia", "Bosnia",
        "Brazil", "Britain", "Bulgaria", "Cambodia", "Cameroon", "Canada", "Chile", "China",
        "Colombia", "Congo", "Croatia", "Cuba", "Cyprus", "Czechia", "Denmark", "Ecuador",
        "Egypt", "England", "Estonia", "Ethiopia", "Finland", "France", "Gaza", "Georgia",
        "Germany", "Ghana", "Greece", "Guatemala", "Haiti", "Honduras", "Hungary", "Iceland",
        "India", "Indonesia", "Iran", "Iraq", "Ireland", "Israel", "Italy", "Jamaica", "Japan",
        "Jordan", "Kazakhstan", "Kenya", "Kosovo", "Kuwait", "Latvia", "Lebanon", "Libya",
        "Lithuania", "Luxembourg", "Malaysia", "Mali", "Mexico", "Moldova", "Mongolia",
        "Morocco", "Mozambique", "Myanmar", "Nepal", "Netherlands", "New Zealand", "Nicaragua",
        "Niger", "Nigeria", "North Korea", "Norway", "Oman", "Pakistan", "Palestine", "Panama",
        "Paraguay", "Peru", "Philippines", "Poland", "Portugal", "Qatar", "Romania", "Russia",
        "Rwanda", "Saudi Arabia", "Scotland", "Senegal", "Serbia", "Singapore", "Slovakia",
        "Slovenia", "Somalia", "South Africa", "South Korea", "Spain", "Sri Lanka", "Sudan",
        "Sweden", "Switzerland", "Syria", "Taiwan", "Tanzania", "Thailand", "Tunisia", "Turkey",
        "Uganda", "Ukraine", "United Arab Emirates", "United Kingdom", "United States",
        "Uruguay", "Venezuela", "Vietnam", "Wales", "Yemen", "Zambia", "Zimbabwe",
        "US", "U.S.", "USA", "UK", "U.K.", "UAE", "America",
        // states and provinces
        "Alabama", "Alaska", "Arizona", "Arkansas", "California", "Colorado", "Connecticut",
        "Delaware", "Florida", "Hawaii", "Idaho", "Illinois", "Indiana", "Iowa", "Kansas",
        "Kentucky", "Louisiana", "Maine", "Maryland", "Massachusetts", "Michigan", "Minnesota",
        "Mississippi", "Missouri", "Montana", "Nebraska", "Nevada", "New Hampshire",
        "New Jersey", "New Mexico", "New York", "North Carolina", "North Dakota", "Ohio",
        "Oklahoma", "Oregon", "Pennsylvania", "Rhode Island", "South Carolina", "South Dakota",
        "Tennessee", "Texas", "Utah", "Vermont", "Virginia", "Washington", "West Virginia",
        "Wisconsin", "Wyoming", "Ontario", "Quebec", "Alberta", "British Columbia",
        // cities
        "Amsterdam", "Athens", "Atlanta", "Baghdad", "Bangkok", "Barcelona", "Beijing",
        "Beirut", "Berlin", "Boston", "Brussels", "Budapest", "Buenos Aires", "Cairo",
        "Chicago", "Dallas", "Delhi", "Denver", "Detroit", "Dubai", "Dublin", "Edinburgh",
        "Frankfurt", "Geneva", "Hong Kong", "Houston", "Istanbul", "Jakarta", "Jerusalem",
        "Johannesburg", "Kabul", "Karachi", "Kyiv", "Kiev", "Lagos", "Lisbon", "London",
        "Los Angeles", "Madrid", "Manchester", "Manila", "Melbourne", "Mexico City", "Miami",
        "Milan", "Montreal", "Moscow", "Mumbai", "Munich", "Nairobi", "New Delhi",
        "New Orleans", "Oslo", "Ottawa", "Paris", "Philadelphia", "Phoenix", "Prague", "Rome",
        "San Francisco", "Santiago", "Sao Paulo", "Seattle", "Seoul", "Shanghai", "Singapore",
        "Stockholm", "Sydney", "Tehran", "Tel Aviv", "Tokyo", "Toronto", "Vancouver", "Vienna",
        "Warsaw", "Washington D.C.", "Zurich",
    ]
    .into_iter()
    .collect();

    pub static ref LOCATIONS: HashSet<&'static str> = [
        "Africa", "Antarctica", "Arctic", "Asia", "Europe", "North America", "South America",
        "Latin America", "Middle East", "Oceania", "Caribbean", "Mediterranean", "Balkans",
        "Scandinavia", "Sahara", "Himalayas", "Alps", "Amazon Basin", "Silicon Valley",
        "West Bank", "Gulf Coast", "Midwest", "Pacific", "Atlantic",
    ]
    .into_iter()
    .collect();

    pub static ref ORGANIZATIONS: HashSet<&'static str> = [
        "Fed", "Federal Reserve", "Congress", "Senate", "Parliament", "Pentagon", "White House",
        "Supreme Court", "Kremlin", "NATO", "United Nations", "UN", "European Union", "EU",
        "World Bank", "IMF", "WHO", "World Health Organization", "FBI", "CIA", "NASA", "SEC",
        "FDA", "EPA", "OPEC", "Bank of England", "European Central Bank", "ECB", "Hamas",
        "Hezbollah", "Taliban", "Democrats", "Republicans", "Labour", "Conservatives",
        "Apple", "Google", "Alphabet", "Amazon", "Microsoft", "Meta", "Facebook", "Instagram",
        "Twitter", "Tesla", "SpaceX", "Nvidia", "Intel", "IBM", "Samsung", "Sony", "Netflix",
        "OpenAI", "Uber", "Boeing", "Airbus", "Toyota", "Volkswagen", "Ford", "Pfizer",
        "Moderna", "Walmart", "Disney", "Goldman Sachs", "Morgan Stanley", "JPMorgan",
        "JPMorgan Chase", "Citigroup", "BlackRock", "Berkshire Hathaway", "Reuters", "BBC",
        "CNN", "Fox News", "New York Times", "Washington Post", "Wall Street Journal",
        "Associated Press", "Bloomberg", "Nasdaq", "Wall Street", "FIFA", "NFL", "NBA", "MLB",
        "Olympics", "Harvard", "Stanford", "MIT", "Oxford", "Cambridge", "General Motors",
        "Bank of America", "Johnson & Johnson", "Procter & Gamble", "AT&T",
    ]
    .into_iter()
    .collect();
}

/// Final words that mark an organization name.
pub const ORG_SUFFIXES: &[&str] = &[
    "Inc", "Corp", "Corporation", "Co", "Company", "Ltd", "LLC", "Plc", "PLC", "Group",
    "Holdings", "Bank", "Bancorp", "Capital", "Partners", "Technologies", "Systems",
    "Motors", "Airlines", "Pharmaceuticals", "University", "College", "Institute", "School",
    "Academy", "Association", "Society", "Foundation", "Federation", "Union", "Council",
    "Committee", "Commission", "Agency", "Administration", "Authority", "Bureau",
    "Department", "Ministry", "Office", "Party", "Court", "Police", "Army", "Navy",
    "Times", "Post", "Journal", "News", "Network", "Club", "FC", "Team",
];

/// Leading words after which `of`/`for` still continues the same name.
pub const NAME_HEADS: &[&str] = &[
    "Bank", "University", "Department", "Ministry", "Bureau", "Institute", "Secretary",
    "Council", "Board", "Office", "College", "School", "Museum", "Church", "Republic",
    "Kingdom", "States", "Gulf", "Sea", "Bay", "Isle", "Cape", "Lake", "Mount", "City",
    "House", "Court", "Chamber", "Federation", "Union", "Association", "Society", "Academy",
    "Commission", "Committee", "Agency", "Corporation", "Center", "Centers", "Centre",
    "Federal", "Reserve", "Party", "Army", "Coalition",
];

/// Final words that mark a geographic feature.
pub const LOCATION_SUFFIXES: &[&str] = &[
    "River", "Valley", "Ocean", "Sea", "Lake", "Mountain", "Mountains", "Mount", "Desert",
    "Island", "Islands", "Bay", "Gulf", "Coast", "Peninsula", "Strait", "Canyon", "Forest",
    "Park", "Basin", "Plains", "Hills", "Region", "Province", "County", "Glacier",
];

/// Honorifics and offices that precede a personal name. Stripped from the entity.
pub const PERSON_TITLES: &[&str] = &[
    "Mr", "Mrs", "Ms", "Miss", "Dr", "Prof", "Professor", "Sir", "Dame", "Lord", "Lady",
    "President", "Vice", "Prime", "Minister", "Chancellor", "Secretary", "Senator", "Sen",
    "Representative", "Rep", "Governor", "Gov", "Mayor", "Judge", "Justice", "King", "Queen",
    "Prince", "Princess", "Pope", "General", "Gen", "Colonel", "Col", "Captain", "Capt",
    "Lieutenant", "Lt", "Sgt", "Sergeant", "Chief", "Executive", "Officer", "Chair",
    "Chairman", "Chairwoman", "Director", "Coach", "Ambassador", "Speaker", "Leader",
    "Commissioner", "Attorney", "Detective", "Rev", "Reverend", "Father", "Sister",
    "Saint", "St", "CEO", "CFO", "Founder", "Co-founder",
];

/// Verbs that, right after a lone capitalized word, make it a person.
pub const SPEECH_VERBS: &[&str] = &[
    "said", "says", "told", "added", "explained", "argued", "wrote", "noted", "stated",
    "tweeted", "announced", "warned", "insisted",
];

/// Capitalized words that are never entities on their own.
pub const NOT_ENTITIES: &[&str] = &[
    "CEO", "CFO", "COO", "CTO", "TV", "AI", "GDP", "IPO", "OK", "AM", "PM", "PDF", "FAQ",
    "COVID", "II", "III", "IV",
];

pub const MONTHS: &[&str] = &[
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December", "Jan", "Feb", "Mar", "Apr", "Jun", "Jul", "Aug",
    "Sep", "Sept", "Oct", "Nov", "Dec",
];

pub const WEEKDAYS: &[&str] = &[
    "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
];
