//! Typed payloads for each extension kind.

use rkyv::{Archive, Deserialize, Serialize};

use super::ExtensionId;

/// The extension kinds participating in the draft/publish protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionKind {
    /// A course in the catalog.
    Course,
    /// A thematic grouping of courses.
    Subject,
    /// An organization offering courses.
    Organization,
    /// A taxonomy category.
    Category,
    /// A session of a course with enrollment dates.
    CourseRun,
}

impl ExtensionKind {
    /// All kinds, in registration order.
    pub const ALL: [ExtensionKind; 5] = [
        ExtensionKind::Course,
        ExtensionKind::Subject,
        ExtensionKind::Organization,
        ExtensionKind::Category,
        ExtensionKind::CourseRun,
    ];

    /// Stable name, used in index keys and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtensionKind::Course => "course",
            ExtensionKind::Subject => "subject",
            ExtensionKind::Organization => "organization",
            ExtensionKind::Category => "category",
            ExtensionKind::CourseRun => "course_run",
        }
    }
}

impl std::fmt::Display for ExtensionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured fields of a course.
///
/// The `active_session` field is the course key of the current session and
/// is a business key: unique within each version partition when set.
#[derive(Debug, Clone, PartialEq, Default, Archive, Serialize, Deserialize)]
pub struct CourseData {
    /// Course key of the active course session.
    pub active_session: Option<String>,
    /// The organization responsible for the course.
    ///
    /// Must always be a member of the `course_organizations` relation;
    /// the invariant enforcer adds it after every save if missing.
    pub main_organization: Option<ExtensionId>,
}

/// Structured fields of an organization.
#[derive(Debug, Clone, PartialEq, Default, Archive, Serialize, Deserialize)]
pub struct OrganizationData {
    /// Organization code, indexed for display lookups.
    pub code: Option<String>,
}

/// Structured fields of a course run.
#[derive(Debug, Clone, PartialEq, Default, Archive, Serialize, Deserialize)]
pub struct CourseRunData {
    /// Link to the run on the LMS.
    pub resource_link: Option<String>,
    /// Course start, microseconds since Unix epoch.
    pub start: Option<u64>,
    /// Course end, microseconds since Unix epoch.
    pub end: Option<u64>,
    /// Enrollment start, microseconds since Unix epoch.
    pub enrollment_start: Option<u64>,
    /// Enrollment end, microseconds since Unix epoch.
    pub enrollment_end: Option<u64>,
    /// Language codes of the course content, order preserved.
    pub languages: Vec<String>,
}

/// Payload of an extension, tagged by kind.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub enum ExtensionData {
    /// Course payload.
    Course(CourseData),
    /// Subjects carry no structured fields of their own.
    Subject,
    /// Organization payload.
    Organization(OrganizationData),
    /// Categories carry no structured fields of their own.
    Category,
    /// Course run payload.
    CourseRun(CourseRunData),
}

impl ExtensionData {
    /// The kind this payload belongs to.
    pub fn kind(&self) -> ExtensionKind {
        match self {
            ExtensionData::Course(_) => ExtensionKind::Course,
            ExtensionData::Subject => ExtensionKind::Subject,
            ExtensionData::Organization(_) => ExtensionKind::Organization,
            ExtensionData::Category => ExtensionKind::Category,
            ExtensionData::CourseRun(_) => ExtensionKind::CourseRun,
        }
    }

    /// Get the course payload, if this is a course.
    pub fn as_course(&self) -> Option<&CourseData> {
        match self {
            ExtensionData::Course(course) => Some(course),
            _ => None,
        }
    }

    /// Get the organization payload, if this is an organization.
    pub fn as_organization(&self) -> Option<&OrganizationData> {
        match self {
            ExtensionData::Organization(organization) => Some(organization),
            _ => None,
        }
    }

    /// Get the course run payload, if this is a course run.
    pub fn as_course_run(&self) -> Option<&CourseRunData> {
        match self {
            ExtensionData::CourseRun(run) => Some(run),
            _ => None,
        }
    }
}
