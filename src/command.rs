// Main menu commands. Tokens are matched exactly (no case folding); anything
// not in the table becomes `Command::Unknown`.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SwitchAccount,
    MyPackages,
    HotPackages,
    HotPackages2,
    PackageByOption,
    PackagesByFamily,
    AutoBuy,
    TransactionHistory,
    FamilyPlan,
    Circle,
    StoreSegments,
    StoreFamilyList,
    StorePackages,
    Redeemables,
    RegisterIdentity,
    ValidateMsisdn,
    Notifications,
    Monitor,
    Bookmarks,
    ToggleTheme,
    Exit,
    Unknown(String),
}

impl Command {
    /// Menu rows in display order: (token, label).
    pub const MENU: &'static [(&'static str, &'static str)] = &[
        ("1", "Login / Switch account"),
        ("2", "My packages"),
        ("3", "HOT packages"),
        ("4", "HOT packages 2"),
        ("5", "Buy package (option code)"),
        ("6", "Buy package (family code)"),
        ("7", "AUTO BUY LOOP (DANGEROUS)"),
        ("8", "Transaction history"),
        ("9", "Family plan"),
        ("10", "Circle"),
        ("11", "Store segments"),
        ("12", "Store family list"),
        ("13", "Store packages"),
        ("14", "Redeemables"),
        ("R", "Register identity (Dukcapil)"),
        ("V", "Validate MSISDN"),
        ("N", "Notifications"),
        ("S", "Sentry mode"),
        ("00", "Bookmarks"),
        ("T", "Switch theme (dark / minimal)"),
        ("99", "Exit"),
    ];

    /// Parse an already-trimmed token. Empty input has no command.
    pub fn parse(token: &str) -> Option<Self> {
        let cmd = match token {
            "" => return None,
            "1" => Self::SwitchAccount,
            "2" => Self::MyPackages,
            "3" => Self::HotPackages,
            "4" => Self::HotPackages2,
            "5" => Self::PackageByOption,
            "6" => Self::PackagesByFamily,
            "7" => Self::AutoBuy,
            "8" => Self::TransactionHistory,
            "9" => Self::FamilyPlan,
            "10" => Self::Circle,
            "11" => Self::StoreSegments,
            "12" => Self::StoreFamilyList,
            "13" => Self::StorePackages,
            "14" => Self::Redeemables,
            "R" => Self::RegisterIdentity,
            "V" => Self::ValidateMsisdn,
            "N" => Self::Notifications,
            "S" => Self::Monitor,
            "00" => Self::Bookmarks,
            "T" => Self::ToggleTheme,
            "99" => Self::Exit,
            other => Self::Unknown(other.to_string()),
        };
        Some(cmd)
    }
}
