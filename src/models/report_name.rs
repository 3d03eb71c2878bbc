//! Known analytics report names and the category each belongs to.
//!
//! The table is static: every name maps to exactly one [`Category`], and the
//! category sent in `filter[category]` is derived from it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::category::Category;

macro_rules! report_names {
    ($($variant:ident => ($name:literal, $category:ident),)+) => {
        /// An analytics report available through report requests.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ReportName {
            $(
                #[doc = $name]
                $variant,
            )+
        }

        impl ReportName {
            /// Every known report name.
            pub const ALL: &'static [ReportName] = &[$(Self::$variant,)+];

            /// The display name used in `filter[name]`.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }

            /// The category this report is filed under.
            pub const fn category(self) -> Category {
                match self {
                    $(Self::$variant => Category::$category,)+
                }
            }
        }
    };
}

report_names! {
    AirPlayDiscoverySessions => ("AirPlay Discovery Sessions", FrameworkUsage),
    HomeScreenWidgetRotations => ("Home Screen Widget Rotations", FrameworkUsage),
    FileBasedVideoPlaybackUsage => ("File-Based Video Playback Usage", FrameworkUsage),
    SafariExtensionsUsage => ("Safari Extensions Usage", FrameworkUsage),
    CrabsBasedVideoPlaybackUsage => ("CRABS-Based Video Playback Usage", FrameworkUsage),
    TranslationRequestUsage => ("Translation Request Usage", FrameworkUsage),
    SafariExtensionsEnablement => ("Safari Extensions Enablement", FrameworkUsage),
    AutomaticSpeechRecognitionUsage => ("Automatic Speech Recognition Usage", FrameworkUsage),
    KeyboardDictationUsage => ("Keyboard Dictation Usage", FrameworkUsage),
    SpatialAudioUsage => ("Spatial Audio Usage", FrameworkUsage),
    VideoDurationInformation => ("Video Duration Information", FrameworkUsage),
    DefaultBrowserUsageRate => ("Default Browser Usage Rate", FrameworkUsage),
    HomeScreenWidgets => ("Home Screen Widgets", FrameworkUsage),
    BrowserChoiceScreenEngagementBeforeIos182 => ("Browser Choice Screen Engagement (iOS versions before 18.2)", FrameworkUsage),
    HomeScreenWidgetUsage => ("Home Screen Widget Usage", FrameworkUsage),
    VisionKitImageAnalysis => ("VisionKit Image Analysis", FrameworkUsage),
    RemindersUsage => ("Reminders Usage", FrameworkUsage),
    PhotoKitImports => ("PhotoKit Imports", FrameworkUsage),
    NetworkingConnectionActivity => ("Networking Connection Activity", Performance),
    SpeechFrameworkTranscriptionRequests => ("Speech Framework Transcription Requests", FrameworkUsage),
    HttpLiveStreamingVideoPlaybackUsage => ("HTTP Live Streaming Video Playback Usage", FrameworkUsage),
    ModeActivityNotifications => ("Mode Activity Notifications", FrameworkUsage),
    MetalCommandQueues => ("Metal Command Queues", FrameworkUsage),
    LockScreenWidgetConfiguration => ("Lock Screen Widget Configuration", FrameworkUsage),
    LocalNetworkPrivacy => ("Local Network Privacy", FrameworkUsage),
    PhotosLibraryAccess => ("Photos Library Access", FrameworkUsage),
    GameControllerSessions => ("Game Controller Sessions", FrameworkUsage),
    SpeechFrameworkTranscriptionRequestAudioDuration => ("Speech Framework Transcription Request Audio Duration", FrameworkUsage),
    TextInputActions => ("Text-Input Actions", FrameworkUsage),
    VisionKitSessions => ("VisionKit Sessions", FrameworkUsage),
    CaMetalLayerPerformance => ("CAMetalLayer Performance", Performance),
    BluetoothSystemWakes => ("Bluetooth System Wakes", Performance),
    AppRuntimeUsage => ("App Runtime Usage", FrameworkUsage),
    AppDownloadsStandard => ("App Downloads Standard", AppStoreCommerce),
    AppDownloadsDetailed => ("App Downloads Detailed", AppStoreCommerce),
    AppInstallPerformance => ("App Install Performance", Performance),
    AppStoreInstallationAndDeletionStandard => ("App Store Installation and Deletion Standard", AppUsage),
    AppStoreInstallationAndDeletionDetailed => ("App Store Installation and Deletion Detailed", AppUsage),
    AppSessionsStandard => ("App Sessions Standard", AppUsage),
    AppSessionsDetailed => ("App Sessions Detailed", AppUsage),
    AppStorePreOrdersStandard => ("App Store Pre-Orders Standard", AppStoreCommerce),
    AppStorePreOrdersDetailed => ("App Store Pre-Orders Detailed", AppStoreCommerce),
    AppStorePurchasesStandard => ("App Store Purchases Standard", AppStoreCommerce),
    AppStorePurchasesDetailed => ("App Store Purchases Detailed", AppStoreCommerce),
    AppStoreDiscoveryAndEngagementStandard => ("App Store Discovery and Engagement Standard", AppStoreEngagement),
    AppStoreDiscoveryAndEngagementDetailed => ("App Store Discovery and Engagement Detailed", AppStoreEngagement),
    FlashlightUsage => ("Flashlight Usage", FrameworkUsage),
    ArKitWorldTracking => ("ARKit World Tracking", FrameworkUsage),
    ArKitWorldTrackingImageDetection => ("ARKit World Tracking Image Detection", FrameworkUsage),
    PhotogrammetryObjectCaptureSessionApiUsage => ("Photogrammetry ObjectCaptureSession API Usage", FrameworkUsage),
}

impl fmt::Display for ReportName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReportName {
    type Err = String;

    /// Parse a display name, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|report| report.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown report name '{s}'"))
    }
}

impl Serialize for ReportName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for ReportName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
