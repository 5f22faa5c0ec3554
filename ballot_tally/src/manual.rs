/*!

This is the long-form manual for `ballot_tally` and `ballotbox`.

## Voter identifiers

An identifier is accepted when:
* it has between 4 and 10 characters (both included). The bounds can be changed with
  the `idRules` section of the configuration.
* it contains only the letters `A-Z`, `a-z` and the digits `0-9`. Accented letters,
  spaces and punctuation are refused.

Identifiers are case-sensitive: `abcd` and `ABCD` are two different voters.

## Record files

The state of an election is stored in two files, both rewritten in full after every
accepted vote.

### Voters file (`voters.csv` by default)

One identifier per line, without header:

```text
ABC123
DEF456
```

### Votes file (`votes.csv` by default)

One line per candidate with the name and the count, without header:

```text
Leonardo DiCaprio,2
"Doe, Jane",0
```

Names that contain a comma or a quote are quoted following the usual CSV conventions.

### Reading the records

Missing files are treated as an election where nobody voted yet. If either file cannot
be read, or if a line is malformed (wrong number of fields, a count that is not a
non-negative integer, an identifier that breaks the identifier rules), both files are
ignored and the election starts from an empty state. A warning is printed in that case.

A line of the votes file that names a candidate missing from the configuration is
skipped with a warning. Configured candidates without a line start at zero.

## Configuration

The `--config` flag takes a JSON file:

```json
{
  "contestName": "Best Actor",
  "candidates": [
    { "name": "Leonardo DiCaprio" },
    { "name": "Marlon Brando" }
  ],
  "dataDirectory": "data",
  "votesFile": "votes.csv",
  "votersFile": "voters.csv",
  "idRules": { "minLength": 4, "maxLength": 10 }
}
```

Only `contestName` and `candidates` are mandatory. Relative paths are resolved from the
directory of the configuration file. Without `--config`, the "Best Actor" contest
shown in this page is used with the four default candidates and the `data` directory.

*/
