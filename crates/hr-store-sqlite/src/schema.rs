//! SQL schema for the HR SQLite store.
//!
//! Executed once at connection startup. Table and column names follow the
//! classic `employees` sample database.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS employees (
    emp_no      INTEGER PRIMARY KEY,
    birth_date  TEXT NOT NULL,
    first_name  TEXT NOT NULL,
    last_name   TEXT NOT NULL,
    gender      TEXT NOT NULL CHECK (gender IN ('M', 'F')),
    hire_date   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS departments (
    dept_no     TEXT PRIMARY KEY,   -- lowercase, e.g. 'd001'
    dept_name   TEXT NOT NULL UNIQUE
);

-- History tables. Dates are ISO 8601 'YYYY-MM-DD'; the open row of a stream
-- has to_date = '9999-01-01'. Rows are never deleted.
CREATE TABLE IF NOT EXISTS titles (
    emp_no      INTEGER NOT NULL REFERENCES employees(emp_no),
    title       TEXT NOT NULL,
    from_date   TEXT NOT NULL,
    to_date     TEXT NOT NULL,
    PRIMARY KEY (emp_no, title, from_date)
);

CREATE TABLE IF NOT EXISTS salaries (
    emp_no      INTEGER NOT NULL REFERENCES employees(emp_no),
    salary      INTEGER NOT NULL,
    from_date   TEXT NOT NULL,
    to_date     TEXT NOT NULL,
    PRIMARY KEY (emp_no, from_date)
);

-- from_date is part of the key so an employee can return to a department.
CREATE TABLE IF NOT EXISTS dept_emp (
    emp_no      INTEGER NOT NULL REFERENCES employees(emp_no),
    dept_no     TEXT NOT NULL REFERENCES departments(dept_no),
    from_date   TEXT NOT NULL,
    to_date     TEXT NOT NULL,
    PRIMARY KEY (emp_no, dept_no, from_date)
);

CREATE TABLE IF NOT EXISTS dept_manager (
    emp_no      INTEGER NOT NULL REFERENCES employees(emp_no),
    dept_no     TEXT NOT NULL REFERENCES departments(dept_no),
    from_date   TEXT NOT NULL,
    to_date     TEXT NOT NULL,
    PRIMARY KEY (emp_no, dept_no, from_date)
);

CREATE INDEX IF NOT EXISTS titles_open_idx       ON titles(emp_no, to_date);
CREATE INDEX IF NOT EXISTS salaries_open_idx     ON salaries(emp_no, to_date);
CREATE INDEX IF NOT EXISTS dept_emp_open_idx     ON dept_emp(emp_no, to_date);
CREATE INDEX IF NOT EXISTS dept_emp_dept_idx     ON dept_emp(dept_no, emp_no);
CREATE INDEX IF NOT EXISTS dept_manager_open_idx ON dept_manager(emp_no, to_date);

PRAGMA user_version = 1;
";
